//! End-of-run summary and CSV export.

use crate::scrape::RunReport;

/// Renders the end-of-run summary block printed to stdout
pub fn format_summary(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("========================\n");
    output.push_str("Golden Eagle cost sweep\n");
    output.push_str("========================\n");

    for (category, subtotal) in &report.category_totals {
        output.push_str(&format!("{}: {} GE\n", category.as_str(), subtotal));
    }
    for category in &report.failed_categories {
        output.push_str(&format!("{}: unreachable, skipped\n", category.as_str()));
    }

    output.push_str("------------------------\n");
    output.push_str(&format!(
        "Total GE cost of all units: {}\n",
        report.total.grand_total
    ));
    output.push_str(&format!(
        "Units processed: {} ({} without any cost fields)\n",
        report.total.items_processed, report.total.items_skipped
    ));

    output
}

/// Writes the per-unit rows to a CSV file
pub fn write_csv(report: &RunReport, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for item in &report.items {
        writer.serialize(item)?;
    }
    writer.flush()?;

    log::info!("Wrote {} unit rows to {}", report.items.len(), path);
    Ok(())
}
