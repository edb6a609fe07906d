//! Per-site robots.txt policy cache
//!
//! Each site origin (`scheme://authority`) is resolved at most once per run. The first
//! caller for an origin fetches robots.txt while later callers for the same origin wait
//! on the same cell; lookups for already-resolved origins only take the read lock.

use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::extract_authority;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use url::Url;

/// Resolved crawling policy for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsPolicy {
    /// robots.txt was retrieved; answer from its rules
    Allowed(ParsedRobots),

    /// robots.txt could not be retrieved; everything is allowed
    Unknown,
}

impl RobotsPolicy {
    /// Checks if a URL may be fetched under this policy
    pub fn allows(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::Allowed(rules) => rules.is_allowed(url, user_agent),
            Self::Unknown => true,
        }
    }
}

/// Lazily filled map from site origin to its robots.txt policy
///
/// Entries are never refreshed or evicted during a run.
pub struct RobotsCache {
    client: Client,
    entries: RwLock<HashMap<String, Arc<OnceCell<RobotsPolicy>>>>,
}

impl RobotsCache {
    /// Creates an empty cache that fetches robots.txt with `client`
    pub fn new(client: Client) -> Self {
        Self {
            client,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Checks if `url` may be fetched according to its site's robots.txt
    ///
    /// URLs without a host are allowed; the scope filter rejects them earlier.
    pub async fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        let Some(origin) = origin_of(url) else {
            return true;
        };

        let cell = self.cell_for(&origin).await;
        let policy = cell
            .get_or_init(|| fetch_robots(&self.client, &origin))
            .await;

        policy.allows(url.as_str(), user_agent)
    }

    /// Seeds the policy for an origin such as `http://www.ics.uci.edu`
    ///
    /// Has no effect if the origin has already been resolved.
    pub async fn insert(&self, origin: &str, policy: RobotsPolicy) {
        let mut entries = self.entries.write().await;
        entries
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new_with(Some(policy))));
    }

    /// Returns the resolved policy for an origin, if any
    pub async fn policy(&self, origin: &str) -> Option<RobotsPolicy> {
        let entries = self.entries.read().await;
        entries.get(origin).and_then(|cell| cell.get().cloned())
    }

    /// Number of origins with a cache entry
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if no origin has been looked up yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn cell_for(&self, origin: &str) -> Arc<OnceCell<RobotsPolicy>> {
        if let Some(cell) = self.entries.read().await.get(origin) {
            return Arc::clone(cell);
        }

        let mut entries = self.entries.write().await;
        Arc::clone(
            entries
                .entry(origin.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}

/// `scheme://authority` of a URL, the key robots.txt applies to
pub fn origin_of(url: &Url) -> Option<String> {
    extract_authority(url).map(|authority| format!("{}://{}", url.scheme(), authority))
}
