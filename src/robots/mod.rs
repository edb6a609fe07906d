//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! A site whose robots.txt cannot be retrieved is crawled as if it had none.

mod cache;
mod parser;

pub use cache::{origin_of, RobotsCache, RobotsPolicy};
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};

/// Fetches and parses robots.txt for a site origin
///
/// # Status Handling
///
/// | Response | Policy |
/// |----------|--------|
/// | 2xx | rules parsed from the body |
/// | 401 / 403 | everything disallowed |
/// | other status, network error, unreadable body | `Unknown` (allow all) |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The site origin, e.g. `http://www.ics.uci.edu`
pub async fn fetch_robots(client: &Client, origin: &str) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unreachable for {}: {}", origin, e);
            return RobotsPolicy::Unknown;
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::info!("robots.txt for {} answered {}, treating site as disallowed", origin, status);
        return RobotsPolicy::Allowed(ParsedRobots::disallow_all());
    }

    if !status.is_success() {
        tracing::debug!("robots.txt for {} answered {}, policy unknown", origin, status);
        return RobotsPolicy::Unknown;
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::Allowed(ParsedRobots::from_content(&body)),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body for {}: {}", origin, e);
            RobotsPolicy::Unknown
        }
    }
}
