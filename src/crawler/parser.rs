//! HTML link extraction
//!
//! This module pulls the followable links out of an accepted page and canonicalizes them.

use crate::url::canonicalize;
use crate::{UrlError, UrlResult};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the canonical form of every followable link on the page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags inside `<body>` that have text content
///
/// **Exclude:**
/// - Anchors without text (image-only links, empty anchors)
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only references (`#section`)
///
/// Links are returned in document order with duplicates removed. Scope and robots checks
/// are left to the caller.
///
/// # Example
///
/// ```
/// use crawl_sieve::crawler::extract_links;
/// use scraper::Html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/news/page/2">Older</a><a href="/news/page/3">Oldest</a></body></html>"#;
/// let base = Url::parse("http://www.ics.uci.edu/").unwrap();
/// let links = extract_links(&Html::parse_document(html), &base);
/// assert_eq!(links, vec!["http://www.ics.uci.edu/news/".to_string()]);
/// ```
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("body a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if element.text().all(str::is_empty) {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match resolve_link(href, base_url) {
            Ok(link) => {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
            Err(e) => tracing::trace!("Skipping link on {}: {}", base_url, e),
        }
    }

    links
}

/// Canonicalizes one href, refusing references that can never be pages
fn resolve_link(href: &str, base_url: &Url) -> UrlResult<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Unsupported(href.to_string()));
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return Err(UrlError::Unsupported(href.to_string()));
    }

    canonicalize(base_url, href)
}
