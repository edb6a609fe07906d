use crate::storage::{SqliteStorage, Storage, StorageResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

/// The longest accepted page seen so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPage {
    pub url: String,
    pub word_count: usize,
}

/// Running totals for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages that reached content validation, accepted or not
    pub unique_pages: u64,

    /// Replaced only by a strictly longer accepted page
    pub longest_page: Option<LongestPage>,

    /// Token occurrences across accepted pages
    pub word_frequencies: HashMap<String, u64>,

    /// Accepted pages per subdomain of the primary suffix, sorted by subdomain
    pub subdomains: BTreeMap<String, u64>,
}

impl CrawlStats {
    /// The `limit` most frequent words, ties broken alphabetically
    pub fn top_words(&self, limit: usize) -> Vec<(String, u64)> {
        let mut words: Vec<(String, u64)> = self
            .word_frequencies
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(limit);
        words
    }
}

struct Inner {
    stats: CrawlStats,
    storage: SqliteStorage,
}

/// Accumulates crawl statistics shared by all workers
///
/// Every hook updates the in-memory snapshot first and then writes the change through to
/// storage. The in-memory snapshot stays authoritative when a write fails; the error is
/// returned so the caller can decide whether to log and continue.
///
/// One lock guards both the snapshot and the connection, so concurrent workers never
/// interleave a read-modify-write.
pub struct StatsAccumulator {
    inner: Mutex<Inner>,
}

impl StatsAccumulator {
    /// Creates an accumulator resuming from whatever `storage` already holds
    pub fn new(storage: SqliteStorage) -> StorageResult<Self> {
        let stats = storage.load_stats()?;
        if stats.unique_pages > 0 {
            tracing::info!(
                "Resuming statistics: {} pages, {} distinct words, {} subdomains",
                stats.unique_pages,
                stats.word_frequencies.len(),
                stats.subdomains.len()
            );
        }

        Ok(Self {
            inner: Mutex::new(Inner { stats, storage }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts one more page that reached content validation
    pub fn record_accepted(&self) -> StorageResult<()> {
        let mut inner = self.lock();
        inner.stats.unique_pages += 1;
        inner.storage.increment_unique_pages()?;
        Ok(())
    }

    /// Offers a page as the longest page
    ///
    /// Returns true if it replaced the current record, which happens only when
    /// `word_count` strictly exceeds it.
    pub fn record_candidate_length(&self, url: &str, word_count: usize) -> StorageResult<bool> {
        let mut inner = self.lock();

        let longer = inner
            .stats
            .longest_page
            .as_ref()
            .map_or(true, |current| word_count > current.word_count);
        if !longer {
            return Ok(false);
        }

        let page = LongestPage {
            url: url.to_string(),
            word_count,
        };
        inner.stats.longest_page = Some(page.clone());
        inner.storage.save_longest_page(&page)?;
        Ok(true)
    }

    /// Adds every token occurrence to the word frequency table
    pub fn record_tokens(&self, tokens: &[String]) -> StorageResult<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let mut counts: HashMap<String, u64> = HashMap::new();
        for token in tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }

        let mut inner = self.lock();
        for (word, count) in &counts {
            *inner.stats.word_frequencies.entry(word.clone()).or_insert(0) += count;
        }
        inner.storage.add_word_counts(&counts)
    }

    /// Counts one more accepted page for a subdomain
    pub fn record_subdomain(&self, authority: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        *inner
            .stats
            .subdomains
            .entry(authority.to_string())
            .or_insert(0) += 1;
        inner.storage.increment_subdomain(authority)
    }

    /// A copy of the current totals
    pub fn snapshot(&self) -> CrawlStats {
        self.lock().stats.clone()
    }
}
