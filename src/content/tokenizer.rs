//! Visible-text extraction and tokenization

use crate::CrawlError;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// Runs of two or more alphanumerics, keeping `@ # * & '` so mentions and hashtags survive
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9@#*&']{2,}").expect("token pattern is valid"));

/// Elements whose text never reaches the reader
const HIDDEN_CONTAINERS: &[&str] = &["style", "script", "head", "title", "meta", "noscript"];

/// Words that carry no information on their own
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Loads the stop-word file
    ///
    /// The crawl cannot judge content without it, so a missing or empty file is an error.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let text = std::fs::read_to_string(path).map_err(|source| CrawlError::StopWords {
            path: path.to_path_buf(),
            source,
        })?;

        let stop_words = Self::from_text(&text);
        if stop_words.is_empty() {
            return Err(CrawlError::EmptyStopWords {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!("Loaded {} stop words from {}", stop_words.len(), path.display());
        Ok(stop_words)
    }

    /// Parses a comma and/or whitespace separated list
    pub fn from_text(text: &str) -> Self {
        let words = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Joins the page's visible text nodes, lower-cased and separated by spaces
///
/// A text node is hidden when any ancestor is one of the non-visible containers.
/// Comments are not text nodes and never contribute.
pub fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_CONTAINERS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_lowercase());
        }
    }

    parts.join(" ")
}

/// Splits already lower-cased text into tokens, dropping stop words
pub fn tokenize(text: &str, stop_words: &StopWords) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !stop_words.contains(token))
        .map(str::to_string)
        .collect()
}
