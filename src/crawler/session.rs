//! Crawl session: the per-page entry point shared by all workers
//!
//! # Page Processing Flow
//!
//! ```text
//! PageFetchResult
//!   -> skip? (no body, status outside 200..400, not text/html)
//!   -> ContentValidator (too short, too repetitive, near-duplicate)
//!   -> StatsAccumulator (accepted pages only, plus the unique page count)
//!   -> extract_links -> canonicalize -> ScopeFilter (scope, scheme, traps, robots)
//!   -> links returned to the frontier
//! ```

use crate::config::Config;
use crate::content::{
    ContentPolicy, ContentRejection, ContentValidator, StopWords, Validation, Verdict,
};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::page::{PageFetchResult, SkipReason};
use crate::crawler::parser::extract_links;
use crate::robots::RobotsCache;
use crate::state::{CrawlStats, StatsAccumulator};
use crate::storage::{open_storage, SqliteStorage, StorageResult};
use crate::url::{extract_authority, matches_suffix, Rejection, ScopeFilter};
use crate::Result;
use scraper::Html;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// What happened to a fetched page
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Never reached content validation
    Skipped(SkipReason),
    /// Content refused; counted as a unique page but contributes nothing else
    Rejected(ContentRejection),
    /// Content kept; `links` passed every scope and policy check
    ///
    /// `fingerprint_saved` is false when the page's fingerprint reached the in-memory index
    /// but not the database, so a restart would forget it.
    Accepted {
        word_count: usize,
        links: Vec<String>,
        fingerprint_saved: bool,
    },
}

impl PageOutcome {
    /// Links for the frontier; empty unless the page was accepted
    pub fn links(&self) -> &[String] {
        match self {
            Self::Accepted { links, .. } => links,
            _ => &[],
        }
    }

    pub fn into_links(self) -> Vec<String> {
        match self {
            Self::Accepted { links, .. } => links,
            _ => Vec::new(),
        }
    }
}

/// Shared state of one crawl process
///
/// Constructed once and shared as `Arc<CrawlSession>`. Each structure it owns carries its
/// own lock, so workers only contend on the structure they are touching.
pub struct CrawlSession {
    config: Config,
    validator: ContentValidator,
    stats: StatsAccumulator,
    robots: Arc<RobotsCache>,
    filter: ScopeFilter,
}

impl CrawlSession {
    /// Opens a session backed by the configured database
    ///
    /// Loads the stop-word list (a missing list is fatal) and resumes statistics and the
    /// near-duplicate index from the database unless `fresh` is set.
    pub fn open(config: Config, fresh: bool) -> Result<Self> {
        let stop_words = StopWords::load(Path::new(&config.content.stop_words_path))?;

        let db_path = Path::new(&config.output.database_path);
        let index_storage = open_storage(db_path, fresh)?;
        let stats_storage = SqliteStorage::new(db_path)?;

        Self::from_parts(config, stop_words, index_storage, stats_storage)
    }

    /// Opens a session that keeps everything in memory
    pub fn in_memory(config: Config, stop_words: StopWords) -> Result<Self> {
        Self::from_parts(
            config,
            stop_words,
            SqliteStorage::new_in_memory()?,
            SqliteStorage::new_in_memory()?,
        )
    }

    fn from_parts(
        config: Config,
        stop_words: StopWords,
        index_storage: SqliteStorage,
        stats_storage: SqliteStorage,
    ) -> Result<Self> {
        let client = build_http_client(&config.user_agent)?;
        let robots = Arc::new(RobotsCache::new(client));
        let filter = ScopeFilter::new(&config.scope, Arc::clone(&robots));

        let validator = ContentValidator::new(
            stop_words,
            ContentPolicy::from(&config.content),
            index_storage,
        )?;
        let stats = StatsAccumulator::new(stats_storage)?;

        Ok(Self {
            config,
            validator,
            stats,
            robots,
            filter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validator(&self) -> &ContentValidator {
        &self.validator
    }

    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    pub fn filter(&self) -> &ScopeFilter {
        &self.filter
    }

    /// A copy of the running statistics
    pub fn stats(&self) -> CrawlStats {
        self.stats.snapshot()
    }

    /// Returns true if the URL may be crawled
    pub async fn is_valid(&self, url: &str) -> bool {
        self.filter.is_allowed(url).await
    }

    /// Like [`is_valid`](Self::is_valid) but explains a refusal
    pub async fn check(&self, url: &str) -> std::result::Result<(), Rejection> {
        self.filter.check(url).await
    }

    /// Processes one fetched page
    ///
    /// An accepted page always has its statistics recorded and its links returned, even
    /// when its fingerprint could not be written to the database. That failure is logged
    /// at error level and reported through `fingerprint_saved`. Statistics write failures
    /// are logged and do not affect the outcome.
    pub async fn process_page(&self, page: &PageFetchResult) -> PageOutcome {
        if let Some(reason) = page.skip_reason() {
            tracing::debug!("Skipping {}: {}", page.url, reason);
            return PageOutcome::Skipped(reason);
        }

        let Ok(base) = Url::parse(&page.url) else {
            tracing::debug!("Skipping {}: {}", page.url, SkipReason::InvalidUrl);
            return PageOutcome::Skipped(SkipReason::InvalidUrl);
        };

        let (validation, candidates) = self.analyze(page, &base);
        log_stats_failure(&page.url, self.stats.record_accepted());

        let Validation {
            verdict,
            persist_error,
        } = validation;
        let tokens = match verdict {
            Verdict::Accept(tokens) => tokens,
            Verdict::Reject(reason) => {
                tracing::debug!("Rejected {}: {}", page.url, reason);
                return PageOutcome::Rejected(reason);
            }
        };

        self.record_accepted_page(&base, &page.url, &tokens);

        let mut links = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.filter.is_allowed(&candidate).await {
                links.push(candidate);
            }
        }

        tracing::debug!(
            "Accepted {} ({} tokens, {} links)",
            page.url,
            tokens.len(),
            links.len()
        );
        if let Some(e) = &persist_error {
            tracing::error!(
                "Accepted {} but its fingerprint is only held in memory: {}",
                page.url,
                e
            );
        }

        PageOutcome::Accepted {
            word_count: tokens.len(),
            links,
            fingerprint_saved: persist_error.is_none(),
        }
    }

    /// Parses the body, validates its content and, for accepted pages, collects the
    /// canonical link candidates
    ///
    /// Kept synchronous: the parsed document never lives across an await point.
    fn analyze(&self, page: &PageFetchResult, base: &Url) -> (Validation, Vec<String>) {
        let text = page.text().unwrap_or_default();
        let document = Html::parse_document(&text);

        let validation = self.validator.validate(&page.url, &document);
        let candidates = if validation.verdict.is_accept() {
            extract_links(&document, base)
        } else {
            Vec::new()
        };

        (validation, candidates)
    }

    fn record_accepted_page(&self, base: &Url, url: &str, tokens: &[String]) {
        log_stats_failure(
            url,
            self.stats
                .record_candidate_length(url, tokens.len())
                .map(|_| ()),
        );
        log_stats_failure(url, self.stats.record_tokens(tokens));

        let primary_suffix = &self.config.scope.primary_suffix;
        if let Some(authority) = extract_authority(base) {
            if matches_suffix(primary_suffix, &authority) {
                log_stats_failure(url, self.stats.record_subdomain(&authority));
            }
        }
    }
}

fn log_stats_failure(url: &str, result: StorageResult<()>) {
    if let Err(e) = result {
        tracing::warn!("Failed to persist statistics for {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::robots::{ParsedRobots, RobotsPolicy};

    const CONFIG: &str = r#"
[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[scope]
allowed-suffixes = [".ics.uci.edu", ".cs.uci.edu"]
primary-suffix = ".ics.uci.edu"

[content]
stop-words-path = "stop_words.txt"

[output]
database-path = "unused.db"
report-path = "unused.md"
"#;

    async fn session() -> CrawlSession {
        let session = CrawlSession::in_memory(
            parse_config(CONFIG).unwrap(),
            StopWords::from_text("the,and,of,a"),
        )
        .unwrap();
        for origin in [
            "http://www.ics.uci.edu",
            "http://vision.ics.uci.edu",
            "http://www.cs.uci.edu",
        ] {
            session.robots().insert(origin, RobotsPolicy::Unknown).await;
        }
        session
    }

    fn words(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn html_page(url: &str, words: &[String], anchors: &str) -> PageFetchResult {
        let html = format!(
            "<html><head><title>t</title></head><body><p>{}</p>{}</body></html>",
            words.join(" "),
            anchors
        );
        PageFetchResult::new(url, 200, "text/html; charset=utf-8", Some(html.into_bytes()))
    }

    #[tokio::test]
    async fn test_accepted_page_returns_filtered_links() {
        let session = session().await;
        let anchors = r#"
            <a href="/research/">Research</a>
            <a href="/papers/paper.pdf">Paper</a>
            <a href="/docs/docs/file.html">Loop</a>
            <a href="http://www.google.com/">Elsewhere</a>
            <a href="/news/page/2">Older</a>
            <a href="/news/page/3">Oldest</a>
            <a href="http://www.cs.uci.edu/people">CS</a>
        "#;

        let outcome = session
            .process_page(&html_page("http://www.ics.uci.edu/", &words(120, "w"), anchors))
            .await;

        assert_eq!(
            outcome,
            PageOutcome::Accepted {
                // 120 body words plus the seven anchor texts
                word_count: 127,
                links: vec![
                    "http://www.ics.uci.edu/research/".to_string(),
                    "http://www.ics.uci.edu/news/".to_string(),
                    "http://www.cs.uci.edu/people".to_string(),
                ],
                fingerprint_saved: true,
            }
        );
    }

    #[tokio::test]
    async fn test_accepted_and_rejected_page_statistics() {
        let session = session().await;

        let accepted = session
            .process_page(&html_page("http://www.ics.uci.edu/long", &words(120, "w"), ""))
            .await;
        let rejected = session
            .process_page(&html_page("http://www.ics.uci.edu/short", &words(10, "x"), ""))
            .await;

        assert!(matches!(accepted, PageOutcome::Accepted { .. }));
        assert_eq!(
            rejected,
            PageOutcome::Rejected(ContentRejection::TooShort { count: 10 })
        );

        let stats = session.stats();
        assert_eq!(stats.unique_pages, 2);
        let longest = stats.longest_page.unwrap();
        assert_eq!(longest.word_count, 120);
        assert_eq!(longest.url, "http://www.ics.uci.edu/long");
        assert_eq!(stats.word_frequencies.len(), 120);
        assert!(!stats.word_frequencies.contains_key("x0"));
    }

    #[tokio::test]
    async fn test_skipped_pages_do_not_count() {
        let session = session().await;

        let outcome = session
            .process_page(&PageFetchResult::new(
                "http://www.ics.uci.edu/missing",
                404,
                "text/html",
                Some(b"<html></html>".to_vec()),
            ))
            .await;
        assert_eq!(outcome, PageOutcome::Skipped(SkipReason::Status(404)));

        let outcome = session
            .process_page(&PageFetchResult::new(
                "http://www.ics.uci.edu/file",
                200,
                "application/octet-stream",
                Some(vec![0, 1, 2]),
            ))
            .await;
        assert!(matches!(outcome, PageOutcome::Skipped(SkipReason::ContentType(_))));

        let outcome = session
            .process_page(&PageFetchResult::new(
                "http://www.ics.uci.edu/none",
                200,
                "text/html",
                None,
            ))
            .await;
        assert_eq!(outcome, PageOutcome::Skipped(SkipReason::MissingBody));
        assert!(outcome.links().is_empty());

        assert_eq!(session.stats(), CrawlStats::default());
    }

    #[tokio::test]
    async fn test_near_duplicate_page_rejected_without_links() {
        let session = session().await;
        let body = words(100, "topic");

        let first = session
            .process_page(&html_page("http://www.ics.uci.edu/a", &body, r#"<a href="/x">x</a>"#))
            .await;
        let second = session
            .process_page(&html_page("http://www.ics.uci.edu/b", &body, r#"<a href="/y">y</a>"#))
            .await;

        assert_eq!(first.links(), &["http://www.ics.uci.edu/x".to_string()]);
        assert!(matches!(
            second,
            PageOutcome::Rejected(ContentRejection::NearDuplicate { .. })
        ));
        assert!(second.links().is_empty());
        assert_eq!(session.stats().unique_pages, 2);
    }

    #[tokio::test]
    async fn test_subdomains_only_for_primary_suffix() {
        let session = session().await;

        session
            .process_page(&html_page("http://vision.ics.uci.edu/", &words(60, "a"), ""))
            .await;
        session
            .process_page(&html_page("http://www.cs.uci.edu/", &words(60, "b"), ""))
            .await;

        let subdomains: Vec<String> = session.stats().subdomains.into_keys().collect();
        assert_eq!(subdomains, vec!["vision.ics.uci.edu".to_string()]);
    }

    #[tokio::test]
    async fn test_is_valid_uses_robots_policy() {
        let session = session().await;
        session
            .robots()
            .insert(
                "https://archive.ics.uci.edu",
                RobotsPolicy::Allowed(ParsedRobots::from_content("User-agent: *\nDisallow: /ml/")),
            )
            .await;

        assert!(session.is_valid("http://www.ics.uci.edu/about").await);
        assert!(session.is_valid("https://archive.ics.uci.edu/datasets").await);
        assert!(!session.is_valid("https://archive.ics.uci.edu/ml/datasets").await);
        assert_eq!(
            session.check("https://archive.ics.uci.edu/ml/x").await,
            Err(Rejection::RobotsDisallowed)
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_admit_one() {
        let session = Arc::new(session().await);
        let body = words(70, "same");

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let session = Arc::clone(&session);
                let page = html_page(&format!("http://www.ics.uci.edu/copy{}", i), &body, "");
                tokio::spawn(async move { session.process_page(&page).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), PageOutcome::Accepted { .. }) {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(session.stats().unique_pages, 6);
        assert_eq!(session.validator().indexed(), 1);
    }

    #[tokio::test]
    async fn test_unsaved_fingerprint_still_yields_links_and_statistics() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("crawl.db");
        let stop_words_path = dir.path().join("stop_words.txt");
        std::fs::write(&stop_words_path, "the,and,of,a").unwrap();

        let toml = CONFIG
            .replace("\"stop_words.txt\"", &format!("'{}'", stop_words_path.display()))
            .replace("\"unused.db\"", &format!("'{}'", db_path.display()));
        let session = CrawlSession::open(parse_config(&toml).unwrap(), true).unwrap();
        session
            .robots()
            .insert("http://www.ics.uci.edu", RobotsPolicy::Unknown)
            .await;

        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch("DROP TABLE fingerprints;")
            .unwrap();

        let page = html_page(
            "http://www.ics.uci.edu/events",
            &words(80, "event"),
            r#"<a href="/next">Next</a>"#,
        );
        let outcome = session.process_page(&page).await;

        assert_eq!(
            outcome,
            PageOutcome::Accepted {
                word_count: 81,
                links: vec!["http://www.ics.uci.edu/next".to_string()],
                fingerprint_saved: false,
            }
        );

        let stats = session.stats();
        assert_eq!(stats.unique_pages, 1);
        assert_eq!(stats.longest_page.unwrap().word_count, 81);
        assert_eq!(stats.word_frequencies.get("event0"), Some(&1));
        assert_eq!(stats.subdomains.get("www.ics.uci.edu"), Some(&1));
        assert_eq!(session.validator().indexed(), 1);
    }
}
