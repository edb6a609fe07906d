//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{CrawlStats, LongestPage};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every mutating call commits on its own, so an interrupted process leaves the store at
/// the last completed call.
pub trait Storage {
    // ===== Statistics =====

    /// Loads the persisted statistics snapshot
    fn load_stats(&self) -> StorageResult<CrawlStats>;

    /// Increments the unique page counter and returns the new value
    fn increment_unique_pages(&mut self) -> StorageResult<u64>;

    /// Replaces the longest page record
    fn save_longest_page(&mut self, page: &LongestPage) -> StorageResult<()>;

    /// Adds word occurrence counts in one transaction
    fn add_word_counts(&mut self, counts: &HashMap<String, u64>) -> StorageResult<()>;

    /// Increments the page count for a subdomain
    fn increment_subdomain(&mut self, authority: &str) -> StorageResult<()>;

    /// Most frequent words, highest count first, ties broken alphabetically
    fn top_words(&self, limit: usize) -> StorageResult<Vec<(String, u64)>>;

    /// All subdomains with their page counts, sorted by subdomain
    fn subdomain_counts(&self) -> StorageResult<Vec<(String, u64)>>;

    // ===== Near-Duplicate Index =====

    /// Appends a fingerprint
    ///
    /// Returns false if the page key is already indexed; the stored fingerprint is kept.
    fn insert_fingerprint(
        &mut self,
        page_key: &str,
        url: &str,
        fingerprint: u64,
    ) -> StorageResult<bool>;

    /// Loads every indexed `(page_key, fingerprint)` in insertion order
    fn load_fingerprints(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Counts indexed fingerprints
    fn count_fingerprints(&self) -> StorageResult<u64>;

    // ===== Maintenance =====

    /// Deletes all statistics and fingerprints (fresh crawl)
    fn clear_all(&mut self) -> StorageResult<()>;
}
