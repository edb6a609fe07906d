//! Console rendering of the crawl report

use crate::output::report::CrawlReport;

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Unique pages: {}", report.unique_pages);
    match &report.longest_page {
        Some(page) => println!("Longest page: {} ({} words)", page.url, page.word_count),
        None => println!("Longest page: none yet"),
    }
    println!();

    println!("Most common words ({}):", report.top_words.len());
    for (rank, (word, count)) in report.top_words.iter().enumerate() {
        println!("  {:>3}. {} ({})", rank + 1, word, count);
    }
    println!();

    println!("Subdomains ({}):", report.subdomains.len());
    for (authority, count) in &report.subdomains {
        println!("  {}, {}", authority, count);
    }
}
