//! Output module for crawl reports
//!
//! This module handles:
//! - Building the crawl report from statistics or storage
//! - Rendering it as markdown
//! - Printing it to the console

mod markdown;
mod report;
mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{load_report, CrawlReport, OutputError, OutputResult};
pub use stats::print_report;

use crate::config::OutputConfig;
use crate::storage::Storage;
use std::path::Path;

/// Loads the report from storage and writes it to the configured report path
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The report that was written
/// * `Err(OutputError)` - Failed to load or write the report
pub fn export_report(storage: &dyn Storage, config: &OutputConfig) -> OutputResult<CrawlReport> {
    let report = load_report(storage, config.top_words)?;
    let path = Path::new(&config.report_path);
    write_markdown_report(&report, path)?;
    tracing::info!("Wrote crawl report to {}", path.display());
    Ok(report)
}
