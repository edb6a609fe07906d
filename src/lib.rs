//! Crawl-Sieve: per-page decision core for a scoped web crawler
//!
//! This crate decides, for every page a crawl worker fetches, whether the page carries
//! enough unique information to keep, whether it near-duplicates content already seen,
//! which outbound links are worth enqueuing, and whether a link stays inside the crawl's
//! scope and obeys the site's robots.txt policy.

pub mod config;
pub mod content;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Crawl-Sieve operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read stop-word list {path}: {source}")]
    StopWords {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Stop-word list {path} contains no words")]
    EmptyStopWords { path: PathBuf },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to persist fingerprint for {url}: {source}")]
    IndexPersistence {
        url: String,
        source: storage::StorageError,
    },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported link: {0}")]
    Unsupported(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Crawl-Sieve operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use content::{ContentValidator, Fingerprint, NearDuplicateIndex, Verdict};
pub use crawler::{CrawlSession, PageFetchResult, PageOutcome};
pub use robots::{RobotsCache, RobotsPolicy};
pub use state::{CrawlStats, StatsAccumulator};
pub use url::{canonicalize, ScopeFilter};
