//! Sweep driver: walks the configured tech trees and folds unit costs.

use crate::detail::parse_detail;
use crate::error::RunError;
use crate::fetch::Fetcher;
use crate::listing::parse_listing;
use crate::models::{Category, CostRecord, Item, ItemCost, RunTotal};

/// Everything a finished sweep reports
#[derive(Debug, Default)]
pub struct RunReport {
    pub total: RunTotal,
    pub items: Vec<ItemCost>,
    pub category_totals: Vec<(Category, u64)>,
    pub failed_categories: Vec<Category>,
}

/// Drives a sweep with one shared fetcher, so the rate limit spans
/// every request of the run.
pub struct Scraper {
    fetcher: Fetcher,
    base_url: String,
    categories: Vec<Category>,
}

impl Scraper {
    pub fn new(fetcher: Fetcher, base_url: &str, categories: Vec<Category>) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            categories,
        }
    }

    /// Runs the full sweep. An unreachable category is logged and
    /// skipped; the run only fails when no category index was reachable
    /// at all.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.warm_up();

        // Phase one: collect every unit link so progress can be
        // reported as i/n across the whole sweep.
        let categories = self.categories.clone();
        let mut listings: Vec<(Category, Vec<Item>)> = Vec::new();
        let mut failed_categories = Vec::new();

        for category in categories {
            let index_url = category.index_url(&self.base_url);
            log::info!("Fetching unit list from {}", index_url);
            match self.fetcher.fetch(&index_url) {
                Ok(html) => {
                    let items = parse_listing(&html, category, &self.base_url);
                    listings.push((category, items));
                }
                Err(e) => {
                    log::error!("Failed to fetch {} tech tree: {}", category.as_str(), e);
                    failed_categories.push(category);
                }
            }
        }

        if listings.is_empty() {
            return Err(RunError::AllCategoriesFailed {
                attempted: failed_categories.len(),
            });
        }

        let total_units: usize = listings.iter().map(|(_, items)| items.len()).sum();
        log::info!("Total units found: {}", total_units);

        // Phase two: visit every unit page and fold its costs.
        let mut report = RunReport {
            failed_categories,
            ..Default::default()
        };
        let mut index = 0usize;

        for (category, items) in listings {
            let mut category_total = 0u64;
            for item in items {
                index += 1;
                let record = self.unit_record(&item, index, total_units);
                category_total = category_total.saturating_add(record.total());
                report.total.fold(&record);
                report.items.push(ItemCost::new(category, &item, &record));
            }
            report.category_totals.push((category, category_total));
        }

        Ok(report)
    }

    /// Fetches and parses one unit page. An unreachable page folds as
    /// zero so the sweep keeps moving.
    fn unit_record(&mut self, item: &Item, index: usize, total_units: usize) -> CostRecord {
        let record = match self.fetcher.fetch(&item.url) {
            Ok(html) => {
                let parsed = parse_detail(&html);
                for label in &parsed.missing_labels {
                    log::debug!("No usable '{}' value for {} ({})", label, item.name, item.url);
                }
                parsed.record
            }
            Err(e) => {
                log::error!("Failed to fetch unit page {}: {}", item.url, e);
                CostRecord::default()
            }
        };

        log::info!(
            "Processing unit {}/{} - {}: base={}, talisman={}, aces={}, total={}",
            index,
            total_units,
            item.name,
            record.base_cost,
            record.talisman_cost,
            record.ace_cost,
            record.total()
        );

        record
    }

    /// One throwaway GET of the site root before the sweep, to pick up
    /// any cookie or CDN checks. Failure here is not fatal.
    fn warm_up(&mut self) {
        log::info!("Initializing session with homepage fetch");
        if let Err(e) = self.fetcher.fetch(&self.base_url) {
            log::warn!("Homepage fetch failed: {}, continuing anyway", e);
        }
    }
}
