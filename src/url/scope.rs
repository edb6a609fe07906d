//! Crawl scope and site-policy filter
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. Domain scope (allowed host suffix, or allowed `authority + path` prefix)
//! 2. Scheme (`http` / `https`)
//! 3. Repeated path segment (`/a/b/a`)
//! 4. Blocked file extension
//! 5. robots.txt for the site
//!
//! The first four are pure string checks; only the last may touch the network, and only
//! once per site.

use crate::config::ScopeConfig;
use crate::robots::RobotsCache;
use crate::url::domain::extract_authority;
use crate::url::matcher::{matches_prefix, matches_suffix};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Extensions of non-HTML resources; a trailing character after the extension is tolerated
static BLOCKED_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\.(css|js|bmp|gif|jpe?g|ico",
        r"|png|tiff?|mid|mp2|mp3|mp4",
        r"|wav|avi|mov|mpeg|ram|m4v|mkv|ogg|ogv|pdf",
        r"|ps|eps|tex|ppt|pptx|doc|docx|xls|xlsx|names",
        r"|data|dat|exe|bz2|tar|msi|bin|7z|psd|dmg|iso",
        r"|apk|epub|dll|cnf|tgz|sha1",
        r"|thmx|mso|arff|rtf|jar|csv",
        r"|r|py|rkt|ss|sas|java|in|scm|odc|m",
        r"|rm|smil|wmv|swf|wma|zip|rar|gz).?$",
    ))
    .expect("blocked extension pattern is valid")
});

/// Why a URL was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not an absolute URL with a host
    Unparseable,
    /// Host and path are outside the crawl boundary
    OutOfScope,
    /// Scheme other than http/https
    Scheme(String),
    /// A path segment appears more than once
    RepeatedSegment(String),
    /// Path ends in a non-HTML resource extension
    BlockedExtension,
    /// The site's robots.txt disallows the URL
    RobotsDisallowed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable => write!(f, "unparseable URL"),
            Self::OutOfScope => write!(f, "outside crawl scope"),
            Self::Scheme(scheme) => write!(f, "unsupported scheme '{}'", scheme),
            Self::RepeatedSegment(segment) => write!(f, "repeated path segment '{}'", segment),
            Self::BlockedExtension => write!(f, "blocked file extension"),
            Self::RobotsDisallowed => write!(f, "disallowed by robots.txt"),
        }
    }
}

/// Decides whether a canonical URL is eligible for crawling
pub struct ScopeFilter {
    allowed_suffixes: Vec<String>,
    allowed_prefixes: Vec<String>,
    robots_agent: String,
    robots: Arc<RobotsCache>,
}

impl ScopeFilter {
    /// Creates a filter for the configured boundary, consulting `robots` for site policy
    pub fn new(scope: &ScopeConfig, robots: Arc<RobotsCache>) -> Self {
        Self {
            allowed_suffixes: scope.allowed_suffixes.clone(),
            allowed_prefixes: scope.allowed_prefixes.clone(),
            robots_agent: scope.robots_agent.clone(),
            robots,
        }
    }

    /// Runs all five checks
    pub async fn check(&self, url: &str) -> Result<(), Rejection> {
        let parsed = self.check_static(url)?;

        if !self.robots.is_allowed(&parsed, &self.robots_agent).await {
            return Err(Rejection::RobotsDisallowed);
        }

        Ok(())
    }

    /// Returns true if the URL passes all five checks
    pub async fn is_allowed(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Rejected {}: {}", url, reason);
                false
            }
        }
    }

    /// Runs the four checks that need no network access
    pub fn check_static(&self, url: &str) -> Result<Url, Rejection> {
        let parsed = Url::parse(url).map_err(|_| Rejection::Unparseable)?;
        let authority = extract_authority(&parsed).ok_or(Rejection::Unparseable)?;
        let path = parsed.path();

        if !self.in_scope(&authority, path) {
            return Err(Rejection::OutOfScope);
        }

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Rejection::Scheme(parsed.scheme().to_string()));
        }

        if let Some(segment) = repeated_segment(path) {
            return Err(Rejection::RepeatedSegment(segment.to_string()));
        }

        if has_blocked_extension(path) {
            return Err(Rejection::BlockedExtension);
        }

        Ok(parsed)
    }

    /// Suffixes are matched against the whole authority, so an explicit port leaves the
    /// suffix scope
    fn in_scope(&self, authority: &str, path: &str) -> bool {
        self.allowed_suffixes
            .iter()
            .any(|suffix| matches_suffix(suffix, authority))
            || self
                .allowed_prefixes
                .iter()
                .any(|prefix| matches_prefix(prefix, authority, path))
    }
}

/// Returns the first non-empty path segment that occurs twice
pub fn repeated_segment(path: &str) -> Option<&str> {
    let mut seen = HashSet::new();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .find(|segment| !seen.insert(*segment))
}

/// Checks the path against the non-HTML extension list (case-insensitive)
pub fn has_blocked_extension(path: &str) -> bool {
    BLOCKED_EXTENSION.is_match(&path.to_lowercase())
}
