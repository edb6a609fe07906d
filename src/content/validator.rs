//! Page content validation
//!
//! A page is kept when its visible text has enough tokens, enough distinct tokens, and no
//! near-duplicate among the pages accepted before it.

use crate::config::ContentConfig;
use crate::content::fingerprint::{Fingerprint, NearDuplicateIndex};
use crate::content::tokenizer::{tokenize, visible_text, StopWords};
use crate::storage::{SqliteStorage, Storage};
use crate::url::page_key;
use crate::{CrawlError, Result};
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Thresholds deciding whether a page is worth keeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentPolicy {
    /// Fewer surviving tokens than this is too little content
    pub min_tokens: usize,
    /// Distinct / total tokens below this is too repetitive
    pub min_diversity: f64,
    /// Fingerprints at most this many bits apart are near-duplicates
    pub max_hamming_distance: u32,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            min_tokens: 50,
            min_diversity: 0.2,
            max_hamming_distance: 3,
        }
    }
}

impl From<&ContentConfig> for ContentPolicy {
    fn from(config: &ContentConfig) -> Self {
        Self {
            min_tokens: config.min_tokens,
            min_diversity: config.min_diversity,
            max_hamming_distance: config.max_hamming_distance,
        }
    }
}

/// Why a page's content was refused
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRejection {
    TooShort { count: usize },
    TooRepetitive { ratio: f64 },
    /// Carries the page key of the earlier page it resembles
    NearDuplicate { of: String },
}

impl fmt::Display for ContentRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { count } => write!(f, "too little content ({} tokens)", count),
            Self::TooRepetitive { ratio } => {
                write!(f, "too repetitive (diversity {:.3})", ratio)
            }
            Self::NearDuplicate { of } => write!(f, "near-duplicate of page {}", of),
        }
    }
}

/// Outcome of content validation
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The page's surviving tokens, in document order
    Accept(Vec<String>),
    Reject(ContentRejection),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }
}

/// A verdict, plus the error from writing an accepted page's fingerprint to storage
///
/// A failed write never changes the verdict: the fingerprint is already in the in-memory
/// index, so the page stays accepted for the rest of the run.
#[derive(Debug)]
pub struct Validation {
    pub verdict: Verdict,
    pub persist_error: Option<CrawlError>,
}

impl Validation {
    fn decided(verdict: Verdict) -> Self {
        Self {
            verdict,
            persist_error: None,
        }
    }
}

struct IndexState {
    index: NearDuplicateIndex,
    storage: SqliteStorage,
}

/// Decides whether a page carries enough unique information to keep
///
/// Owns the near-duplicate index. Query and insert happen under one lock, so two
/// near-identical pages validated concurrently cannot both be accepted.
pub struct ContentValidator {
    stop_words: StopWords,
    policy: ContentPolicy,
    state: Mutex<IndexState>,
}

impl ContentValidator {
    /// Creates a validator, reloading every fingerprint `storage` already holds
    pub fn new(stop_words: StopWords, policy: ContentPolicy, storage: SqliteStorage) -> Result<Self> {
        let entries = storage
            .load_fingerprints()?
            .into_iter()
            .map(|(key, value)| (key, Fingerprint(value)));
        let index = NearDuplicateIndex::from_entries(policy.max_hamming_distance, entries);

        if !index.is_empty() {
            tracing::info!("Restored {} fingerprints into the near-duplicate index", index.len());
        }

        Ok(Self {
            stop_words,
            policy,
            state: Mutex::new(IndexState { index, storage }),
        })
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Number of fingerprints in the index
    pub fn indexed(&self) -> usize {
        self.lock().index.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The page's visible tokens with stop words removed
    pub fn tokens(&self, document: &Html) -> Vec<String> {
        tokenize(&visible_text(document), &self.stop_words)
    }

    /// Validates a parsed page
    ///
    /// Accepted pages are added to the index and written through to storage. If that write
    /// fails the entry stays in memory and the `CrawlError::IndexPersistence` travels
    /// alongside the accept verdict.
    pub fn validate(&self, url: &str, document: &Html) -> Validation {
        self.validate_tokens(url, self.tokens(document))
    }

    /// Validates an already tokenized page
    pub fn validate_tokens(&self, url: &str, tokens: Vec<String>) -> Validation {
        if tokens.len() < self.policy.min_tokens {
            return Validation::decided(Verdict::Reject(ContentRejection::TooShort {
                count: tokens.len(),
            }));
        }

        let distinct = tokens.iter().collect::<HashSet<_>>().len();
        let ratio = distinct as f64 / tokens.len() as f64;
        if ratio < self.policy.min_diversity {
            return Validation::decided(Verdict::Reject(ContentRejection::TooRepetitive {
                ratio,
            }));
        }

        let fingerprint = Fingerprint::from_tokens(&tokens);
        let key = page_key(url);

        let mut state = self.lock();
        if let Some(existing) = state.index.find_near(fingerprint) {
            return Validation::decided(Verdict::Reject(ContentRejection::NearDuplicate {
                of: existing.to_string(),
            }));
        }

        state.index.insert(key.clone(), fingerprint);
        let persist_error = state
            .storage
            .insert_fingerprint(&key, url, fingerprint.0)
            .err()
            .map(|source| {
                tracing::error!("Failed to persist fingerprint for {}: {}", url, source);
                CrawlError::IndexPersistence {
                    url: url.to_string(),
                    source,
                }
            });

        Validation {
            verdict: Verdict::Accept(tokens),
            persist_error,
        }
    }
}
