//! Crawler module: the per-page decision pipeline
//!
//! This module contains the worker-facing side of the crate, including:
//! - The fetched page model and fetch-level skip rules
//! - HTML link extraction and canonicalization
//! - HTTP client construction for robots.txt fetching
//! - `CrawlSession`, which ties validation, statistics and scope filtering together

mod fetcher;
mod page;
mod parser;
mod session;

pub use fetcher::build_http_client;
pub use page::{is_textual, PageFetchResult, SkipReason};
pub use parser::extract_links;
pub use session::{CrawlSession, PageOutcome};
