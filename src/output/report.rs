//! Report model and error types
//!
//! The report is built either from a live statistics snapshot or straight from storage,
//! so it can be produced for a finished or an interrupted crawl.

use crate::state::{CrawlStats, LongestPage};
use crate::storage::{Storage, StorageError};
use chrono::Utc;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the final crawl report presents
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// When the report was generated (RFC 3339)
    pub generated_at: String,

    /// Pages that reached content validation
    pub unique_pages: u64,

    /// The longest accepted page
    pub longest_page: Option<LongestPage>,

    /// Most common words, highest count first
    pub top_words: Vec<(String, u64)>,

    /// Accepted pages per subdomain, sorted by subdomain
    pub subdomains: Vec<(String, u64)>,
}

impl CrawlReport {
    /// Builds a report from an in-memory snapshot
    pub fn from_stats(stats: &CrawlStats, top_words: usize) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            unique_pages: stats.unique_pages,
            longest_page: stats.longest_page.clone(),
            top_words: stats.top_words(top_words),
            subdomains: stats
                .subdomains
                .iter()
                .map(|(authority, count)| (authority.clone(), *count))
                .collect(),
        }
    }
}

/// Loads a report from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl statistics
/// * `top_words` - How many of the most common words to include
pub fn load_report(storage: &dyn Storage, top_words: usize) -> OutputResult<CrawlReport> {
    let stats = storage.load_stats()?;

    Ok(CrawlReport {
        generated_at: Utc::now().to_rfc3339(),
        unique_pages: stats.unique_pages,
        longest_page: stats.longest_page,
        top_words: storage.top_words(top_words)?,
        subdomains: storage.subdomain_counts()?,
    })
}
