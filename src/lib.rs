//! Unit Cost Scraper - War Thunder Wiki Golden Eagle Sweep
//!
//! Walks the wiki's tech tree pages, extracts per-unit Golden Eagle
//! costs (purchase, Talisman, ace crew) and aggregates them into a
//! run total, with an optional per-unit CSV export.

pub mod detail;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod models;
pub mod report;
pub mod scrape;

// Re-export commonly used items
pub use detail::{parse_detail, ParsedDetail};
pub use error::{FetchError, FetchResult, RunError};
pub use fetch::{Clock, FetchConfig, Fetcher, SystemClock};
pub use listing::parse_listing;
pub use models::{Category, CostRecord, Item, ItemCost, RunTotal};
pub use report::{format_summary, write_csv};
pub use scrape::{RunReport, Scraper};
