use serde::Serialize;

/// Represents the tech tree categories on the wiki
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Aviation,
    Helicopters,
    Ground,
    Ships,
    Boats,
}

impl Category {
    /// Returns the display name of the category (e.g., "Aviation")
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Aviation => "Aviation",
            Category::Helicopters => "Helicopters",
            Category::Ground => "Ground",
            Category::Ships => "Ships",
            Category::Boats => "Boats",
        }
    }

    /// Returns the tech tree path segment used in index URLs (e.g., "aviation")
    pub fn tree_path(&self) -> &'static str {
        match self {
            Category::Aviation => "aviation",
            Category::Helicopters => "helicopters",
            Category::Ground => "ground",
            Category::Ships => "ships",
            Category::Boats => "boats",
        }
    }

    /// Parse a category name or tree path into a Category
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aviation" => Some(Category::Aviation),
            "helicopters" => Some(Category::Helicopters),
            "ground" => Some(Category::Ground),
            "ships" => Some(Category::Ships),
            "boats" => Some(Category::Boats),
            _ => None,
        }
    }

    /// Returns all categories in sweep order
    pub fn all() -> &'static [Category] {
        &[
            Category::Aviation,
            Category::Helicopters,
            Category::Ground,
            Category::Ships,
            Category::Boats,
        ]
    }

    /// Builds the index page URL for this category's tech tree.
    /// The `?v=t` view switch selects the flat tree listing every unit.
    pub fn index_url(&self, base_url: &str) -> String {
        format!("{}/{}?v=t", base_url.trim_end_matches('/'), self.tree_path())
    }
}

/// A unit discovered on a tech tree index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub url: String,
}

/// Golden Eagle cost fields extracted from one unit detail page.
/// A field the page does not show reads as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostRecord {
    pub base_cost: u64,
    pub talisman_cost: u64,
    pub ace_cost: u64,
}

impl CostRecord {
    /// Sum of the three cost fields, clamped at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.base_cost
            .saturating_add(self.talisman_cost)
            .saturating_add(self.ace_cost)
    }

    /// Returns true if no cost field was found on the page
    pub fn is_empty(&self) -> bool {
        self.base_cost == 0 && self.talisman_cost == 0 && self.ace_cost == 0
    }
}

/// Per-unit report row, written to the CSV export
#[derive(Debug, Clone, Serialize)]
pub struct ItemCost {
    pub category: String,
    pub name: String,
    pub url: String,
    pub base_cost: u64,
    pub talisman_cost: u64,
    pub ace_cost: u64,
    pub total: u64,
}

impl ItemCost {
    pub fn new(category: Category, item: &Item, record: &CostRecord) -> Self {
        Self {
            category: category.as_str().to_string(),
            name: item.name.clone(),
            url: item.url.clone(),
            base_cost: record.base_cost,
            talisman_cost: record.talisman_cost,
            ace_cost: record.ace_cost,
            total: record.total(),
        }
    }
}

/// Running aggregate over every processed unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotal {
    pub grand_total: u64,
    pub items_processed: u64,
    pub items_skipped: u64,
}

impl RunTotal {
    /// Fold one unit's record into the total. A record with no cost
    /// fields still counts as processed and additionally as skipped.
    /// The grand total clamps at `u64::MAX` instead of wrapping.
    pub fn fold(&mut self, record: &CostRecord) {
        self.grand_total = self.grand_total.saturating_add(record.total());
        self.items_processed += 1;
        if record.is_empty() {
            self.items_skipped += 1;
        }
    }
}
