//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Running crawl statistics (unique pages, longest page, words, subdomains)
//! - The append-only near-duplicate fingerprint log
//!
//! Reopening the same database file resumes an interrupted crawl.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::CrawlError;

use std::path::Path;

/// Opens a storage database, optionally discarding everything already in it
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `fresh` - Clear all statistics and fingerprints after opening
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlError)` - Failed to initialize storage
pub fn open_storage(path: &Path, fresh: bool) -> Result<SqliteStorage, CrawlError> {
    let mut storage = SqliteStorage::new(path)?;
    if fresh {
        tracing::info!("Clearing previous crawl state in {}", path.display());
        storage.clear_all()?;
    }
    Ok(storage)
}
