//! Unit Cost Scraper - War Thunder Wiki Golden Eagle Sweep
//!
//! Fetches every unit page of the configured tech trees, one request at
//! a time, and prints the aggregate Golden Eagle cost.

use clap::Parser;
use std::time::Duration;
use unit_cost_scraper::{format_summary, write_csv, Category, FetchConfig, Fetcher, Scraper};

/// Sums Golden Eagle unit costs across the War Thunder wiki tech trees
#[derive(Parser, Debug)]
#[command(name = "unit_cost_scraper")]
#[command(version, about, long_about = None)]
struct Args {
    /// Wiki base URL
    #[arg(long, default_value = "https://wiki.warthunder.com")]
    base_url: String,

    /// Tech tree to sweep; repeat the flag for several (default: all)
    #[arg(long, value_parser = parse_category)]
    category: Vec<Category>,

    /// Minimum pause between requests in milliseconds
    #[arg(long, default_value_t = 1500)]
    delay_ms: u64,

    /// Attempts per URL before giving up
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Write per-unit rows to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        format!("unknown category '{s}' (expected aviation, helicopters, ground, ships or boats)")
    })
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let categories = if args.category.is_empty() {
        Category::all().to_vec()
    } else {
        args.category.clone()
    };

    let config = FetchConfig {
        min_delay: Duration::from_millis(args.delay_ms),
        max_attempts: args.max_attempts,
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    };

    log::info!("Starting Golden Eagle cost sweep against {}", args.base_url);

    let fetcher = match Fetcher::new(&args.base_url, config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut scraper = Scraper::new(fetcher, &args.base_url, categories);
    let report = match scraper.run() {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    print!("{}", format_summary(&report));

    if let Some(path) = &args.csv {
        if let Err(e) = write_csv(&report, path) {
            log::error!("Failed to write CSV to {}: {}", path, e);
            std::process::exit(1);
        }
    }
}
