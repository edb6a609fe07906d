//! URL handling module for Crawl-Sieve
//!
//! This module provides link canonicalization (including crawl-trap collapsing),
//! authority extraction, page keys, and the crawl scope and site-policy filter.

mod canonical;
mod domain;
mod matcher;
mod scope;

pub use canonical::{canonicalize, collapse_traps};
pub use domain::{extract_authority, page_key};
pub use matcher::{matches_prefix, matches_suffix};
pub use scope::{has_blocked_extension, repeated_segment, Rejection, ScopeFilter};
