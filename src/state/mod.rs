//! State module for crawl statistics
//!
//! This module accumulates the statistics the report is built from: the number of pages
//! that reached content validation, the longest accepted page, word frequencies, and
//! accepted pages per subdomain.
//!
//! # Components
//!
//! - `CrawlStats`: A snapshot of the running totals
//! - `StatsAccumulator`: Thread-safe, write-through recorder shared by all workers

mod crawl_stats;

pub use crawl_stats::{CrawlStats, LongestPage, StatsAccumulator};
