//! Tech tree index page parsing.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::models::{Category, Item};

// Tree markup as the wiki renders it. A format change only touches
// these strings.
const TREE_ITEM_SELECTOR: &str = "div.wt-tree_item";
const TREE_LINK_SELECTOR: &str = "a.wt-tree_item-link";

/// Extracts unit detail links from a tech tree index page.
///
/// Relative hrefs are resolved against `base_url`. Duplicate URLs keep
/// their first occurrence, in document order. A page without tree
/// markup yields an empty list and a warning, never an error.
pub fn parse_listing(html: &str, category: Category, base_url: &str) -> Vec<Item> {
    let document = Html::parse_document(html);
    let item_sel = Selector::parse(TREE_ITEM_SELECTOR).unwrap();
    let link_sel = Selector::parse(TREE_LINK_SELECTOR).unwrap();
    let base = url::Url::parse(base_url).ok();

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for element in document.select(&item_sel) {
        let link = match element.select(&link_sel).next() {
            Some(link) => link,
            None => continue,
        };
        let href = link.value().attr("href").unwrap_or("");
        if href.is_empty() {
            continue;
        }

        let resolved = match &base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        if !seen.insert(resolved.clone()) {
            continue;
        }

        let text = element_text(&link);
        let name = if text.is_empty() {
            name_from_url(&resolved)
        } else {
            text
        };

        items.push(Item {
            name,
            url: resolved,
        });
    }

    if items.is_empty() {
        log::warn!("No units found in {} tech tree page", category.as_str());
    } else {
        log::info!(
            "Found {} units in {} tech tree",
            items.len(),
            category.as_str()
        );
    }

    items
}

/// Joined, whitespace-normalized text content of an element
fn element_text(element: &ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives a display name from the last path segment of a unit URL
fn name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let segment = segment.split(['?', '#']).next().unwrap_or(segment);
    segment.replace('_', " ")
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
