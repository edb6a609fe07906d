//! Markdown report generation
//!
//! This module renders the crawl report as a markdown document: unique pages, the longest
//! page, the most common words and the subdomain breakdown.

use crate::output::report::{CrawlReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report to `output_path`
///
/// # Arguments
///
/// * `report` - The crawl report data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown report
/// * `Err(OutputError)` - Failed to write report
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Crawl-Sieve Crawl Report\n\n");
    md.push_str(&format!("_Generated {}_\n\n", report.generated_at));

    md.push_str("## Unique Pages\n\n");
    md.push_str(&format!("- **Unique Pages**: {}\n\n", report.unique_pages));

    md.push_str("## Longest Page\n\n");
    match &report.longest_page {
        Some(page) => {
            md.push_str(&format!("- **URL**: {}\n", page.url));
            md.push_str(&format!("- **Words**: {}\n\n", page.word_count));
        }
        None => md.push_str("No page has been accepted yet.\n\n"),
    }

    md.push_str(&format!(
        "## {} Most Common Words\n\n",
        report.top_words.len()
    ));
    if !report.top_words.is_empty() {
        md.push_str("| Rank | Word | Count |\n");
        md.push_str("|------|------|-------|\n");
        for (rank, (word, count)) in report.top_words.iter().enumerate() {
            md.push_str(&format!("| {} | {} | {} |\n", rank + 1, word, count));
        }
        md.push('\n');
    }

    md.push_str("## Subdomains\n\n");
    md.push_str(&format!("Total: {}\n\n", report.subdomains.len()));
    for (authority, count) in &report.subdomains {
        md.push_str(&format!("- {}, {}\n", authority, count));
    }
    if !report.subdomains.is_empty() {
        md.push('\n');
    }

    md
}
