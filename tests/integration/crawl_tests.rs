//! Integration tests for the crawl session
//!
//! These tests use wiremock to serve robots.txt and pages, and drive `CrawlSession`
//! end-to-end: fetch, validate, record statistics, filter links, and resume.

use crawl_sieve::config::{parse_config, Config};
use crawl_sieve::content::{ContentRejection, StopWords};
use crawl_sieve::crawler::{
    build_http_client, CrawlSession, PageFetchResult, PageOutcome, SkipReason,
};
use crawl_sieve::output::export_report;
use crawl_sieve::storage::{SqliteStorage, Storage};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration whose crawl scope is the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let authority = base_url.trim_start_matches("http://");
    let toml = format!(
        r#"
[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[scope]
allowed-suffixes = [".ics.uci.edu"]
allowed-prefixes = ["{authority}/"]
primary-suffix = ".ics.uci.edu"

[content]
stop-words-path = '{stop_words}'

[output]
database-path = '{database}'
report-path = '{report}'
top-words = 5
"#,
        authority = authority,
        stop_words = dir.join("stop_words.txt").display(),
        database = dir.join("crawl.db").display(),
        report = dir.join("report.md").display(),
    );

    std::fs::write(dir.join("stop_words.txt"), "a,an,and,the,of,to,in").unwrap();
    parse_config(&toml).unwrap()
}

fn words(n: usize, prefix: &str) -> String {
    (0..n)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

fn html(body_words: &str, anchors: &str) -> String {
    format!(
        "<html><head><title>Test</title></head><body><p>{}</p>{}</body></html>",
        body_words, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, status: u16, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn fetch(config: &Config, url: &str) -> PageFetchResult {
    let client = build_http_client(&config.user_agent).unwrap();
    let response = client.get(url).send().await.unwrap();
    PageFetchResult::from_response(response).await.unwrap()
}

#[tokio::test]
async fn test_robots_rules_filter_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 200, "User-agent: *\nDisallow: /private/\n", 1).await;
    mount_page(
        &server,
        "/",
        html(
            &words(80, "home"),
            r#"
            <a href="/public/page">Public</a>
            <a href="/private/page">Private</a>
            <a href="/papers/paper.pdf">Paper</a>
            <a href="/docs/docs/file.html">Loop</a>
            <a href="https://www.google.com/">Away</a>
            "#,
        ),
    )
    .await;

    let session = CrawlSession::open(config.clone(), true).unwrap();
    let page = fetch(&config, &format!("{}/", base)).await;
    let outcome = session.process_page(&page).await;

    assert_eq!(outcome.links(), &[format!("{}/public/page", base)]);
    assert!(!session.is_valid(&format!("{}/private/other", base)).await);
    assert!(session.is_valid(&format!("{}/about", base)).await);
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 404, "not found", 1).await;

    let session = CrawlSession::in_memory(config, StopWords::from_text("the")).unwrap();

    assert!(session.is_valid(&format!("{}/anything", base)).await);
    assert!(session.is_valid(&format!("{}/private/too", base)).await);
}

#[tokio::test]
async fn test_forbidden_robots_disallows_site() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 403, "", 1).await;

    let session = CrawlSession::in_memory(config, StopWords::from_text("the")).unwrap();

    assert!(!session.is_valid(&format!("{}/", base)).await);
    assert!(!session.is_valid(&format!("{}/people", base)).await);
}

#[tokio::test]
async fn test_unreachable_robots_fails_open() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on port 1
    let config = create_test_config("http://127.0.0.1:1", dir.path());

    let session = CrawlSession::in_memory(config, StopWords::from_text("the")).unwrap();

    assert!(session.is_valid("http://127.0.0.1:1/page").await);
}

#[tokio::test]
async fn test_robots_fetched_once_under_concurrency() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 200, "User-agent: *\nDisallow: /no/\n", 1).await;

    let session =
        Arc::new(CrawlSession::in_memory(config, StopWords::from_text("the")).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let session = Arc::clone(&session);
            let url = format!("{}/page{}", base, i);
            tokio::spawn(async move { session.is_valid(&url).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(session.robots().len().await, 1);
}

#[tokio::test]
async fn test_accepted_and_rejected_page_statistics() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 404, "", 0).await;
    mount_page(&server, "/long", html(&words(120, "topic"), "")).await;
    mount_page(&server, "/short", html(&words(12, "tiny"), "")).await;

    let session = CrawlSession::open(config.clone(), true).unwrap();

    let long = fetch(&config, &format!("{}/long", base)).await;
    let short = fetch(&config, &format!("{}/short", base)).await;

    let accepted = session.process_page(&long).await;
    let rejected = session.process_page(&short).await;

    assert_eq!(
        accepted,
        PageOutcome::Accepted {
            word_count: 120,
            links: Vec::new(),
            fingerprint_saved: true,
        }
    );
    assert_eq!(
        rejected,
        PageOutcome::Rejected(ContentRejection::TooShort { count: 12 })
    );

    let stats = session.stats();
    assert_eq!(stats.unique_pages, 2);
    let longest = stats.longest_page.unwrap();
    assert_eq!(longest.word_count, 120);
    assert_eq!(longest.url, format!("{}/long", base));

    // Pages on the mock server are outside the primary suffix
    assert!(stats.subdomains.is_empty());
}

#[tokio::test]
async fn test_fetch_level_rejections_leave_no_trace() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string(html(&words(80, "w"), "")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4E, 0x47], "image/png"),
        )
        .mount(&server)
        .await;

    let session = CrawlSession::open(config.clone(), true).unwrap();

    let gone = session
        .process_page(&fetch(&config, &format!("{}/gone", base)).await)
        .await;
    let logo = session
        .process_page(&fetch(&config, &format!("{}/logo", base)).await)
        .await;

    assert_eq!(gone, PageOutcome::Skipped(SkipReason::Status(404)));
    assert!(matches!(
        logo,
        PageOutcome::Skipped(SkipReason::ContentType(_))
    ));
    assert_eq!(session.stats().unique_pages, 0);
    assert_eq!(session.validator().indexed(), 0);
}

#[tokio::test]
async fn test_resume_keeps_counts_and_dedup_memory() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    let content = words(90, "lecture");
    mount_robots(&server, 404, "", 0).await;
    mount_page(&server, "/original", html(&content, "")).await;
    mount_page(&server, "/mirror", html(&content, "")).await;

    {
        let session = CrawlSession::open(config.clone(), true).unwrap();
        let page = fetch(&config, &format!("{}/original", base)).await;
        let outcome = session.process_page(&page).await;
        assert!(matches!(outcome, PageOutcome::Accepted { .. }));
    }

    // Restart against the same database
    let session = CrawlSession::open(config.clone(), false).unwrap();
    let resumed = session.stats();
    assert_eq!(resumed.unique_pages, 1);
    assert_eq!(resumed.longest_page.as_ref().unwrap().word_count, 90);
    assert_eq!(session.validator().indexed(), 1);

    let page = fetch(&config, &format!("{}/mirror", base)).await;
    let outcome = session.process_page(&page).await;
    assert!(matches!(
        outcome,
        PageOutcome::Rejected(ContentRejection::NearDuplicate { .. })
    ));
    assert_eq!(session.stats().unique_pages, 2);
    drop(session);

    // A fresh start forgets everything
    let session = CrawlSession::open(config.clone(), true).unwrap();
    assert_eq!(session.stats().unique_pages, 0);
    assert_eq!(session.validator().indexed(), 0);
    let outcome = session.process_page(&page).await;
    assert!(matches!(outcome, PageOutcome::Accepted { .. }));
}

#[tokio::test]
async fn test_missing_stop_words_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:1", dir.path());
    std::fs::remove_file(dir.path().join("stop_words.txt")).unwrap();

    let result = CrawlSession::open(config, true);
    assert!(matches!(
        result,
        Err(crawl_sieve::CrawlError::StopWords { .. })
    ));
}

#[tokio::test]
async fn test_report_export_after_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path());

    mount_robots(&server, 404, "", 0).await;
    let repeated = format!("{} {}", words(60, "unique"), "graph ".repeat(10));
    mount_page(&server, "/graphs", html(&repeated, "")).await;

    {
        let session = CrawlSession::open(config.clone(), true).unwrap();
        let page = fetch(&config, &format!("{}/graphs", base)).await;
        session.process_page(&page).await;
    }

    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.top_words(1).unwrap(), vec![("graph".to_string(), 10)]);

    let report = export_report(&storage, &config.output).unwrap();
    assert_eq!(report.unique_pages, 1);
    assert_eq!(report.top_words.len(), 5);

    let markdown = std::fs::read_to_string(&config.output.report_path).unwrap();
    assert!(markdown.contains("| 1 | graph | 10 |"));
    assert!(markdown.contains(&format!("{}/graphs", base)));
}
