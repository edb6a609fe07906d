//! Crawl-Sieve main entry point
//!
//! This is the command-line interface for the Crawl-Sieve page decision core.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use crawl_sieve::config::{load_config_with_hash, Config};
use crawl_sieve::content::StopWords;
use crawl_sieve::crawler::{build_http_client, CrawlSession, PageFetchResult, PageOutcome};
use crawl_sieve::output::{export_report, load_report, print_report, CrawlReport};
use crawl_sieve::robots::RobotsCache;
use crawl_sieve::storage::{SqliteStorage, Storage};
use crawl_sieve::url::{canonicalize, ScopeFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Crawl-Sieve: per-page decision core for a scoped web crawler
///
/// Crawl-Sieve decides whether a fetched page is worth keeping, which of its links stay
/// inside the crawl scope and robots.txt policy, and keeps the running statistics the
/// crawl report is built from.
#[derive(Parser, Debug)]
#[command(name = "crawl-sieve")]
#[command(version = "1.0.0")]
#[command(about = "Per-page decision core for a scoped web crawler", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["check", "page", "stats", "export_summary", "dry_run"])
))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard saved statistics and fingerprints before processing
    #[arg(long)]
    fresh: bool,

    /// Canonicalize URLs and report whether each may be crawled
    #[arg(long, value_name = "URL", num_args = 1..)]
    check: Vec<String>,

    /// Run a saved HTML page through the decision pipeline
    #[arg(long, value_name = "FILE", requires = "url")]
    page: Option<PathBuf>,

    /// URL the saved page was fetched from
    #[arg(long, value_name = "URL", requires = "page")]
    url: Option<String>,

    /// HTTP status the saved page was served with
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Content-Type the saved page was served with
    #[arg(long, default_value = "text/html")]
    content_type: String,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,

    /// Write the markdown report from existing data and exit
    #[arg(long)]
    export_summary: bool,

    /// Validate config and stop-word list without processing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export_summary {
        handle_export_summary(&config)
    } else if !cli.check.is_empty() {
        handle_check(&config, &cli.check).await
    } else if let (Some(page), Some(url)) = (&cli.page, &cli.url) {
        handle_page(config, cli.fresh, page, url, cli.status, &cli.content_type).await
    } else {
        Ok(())
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_sieve=info,warn"),
            1 => EnvFilter::new("crawl_sieve=debug,info"),
            2 => EnvFilter::new("crawl_sieve=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: validates config and the stop-word list
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Crawl-Sieve Dry Run ===\n");

    println!("User Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nScope:");
    for suffix in &config.scope.allowed_suffixes {
        println!("  - *{}", suffix);
    }
    for prefix in &config.scope.allowed_prefixes {
        println!("  - {}*", prefix);
    }
    println!("  Subdomains counted under: {}", config.scope.primary_suffix);
    println!("  robots.txt agent: {}", config.scope.robots_agent);

    println!("\nContent Policy:");
    println!("  Minimum tokens: {}", config.content.min_tokens);
    println!("  Minimum diversity: {}", config.content.min_diversity);
    println!(
        "  Near-duplicate distance: {} bits",
        config.content.max_hamming_distance
    );

    let stop_words = StopWords::load(Path::new(&config.content.stop_words_path))
        .context("Stop-word list is required")?;
    println!(
        "  Stop words: {} ({})",
        stop_words.len(),
        config.content.stop_words_path
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);
    println!("  Top words: {}", config.output.top_words);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let report = load_report(&storage, config.output.top_words)?;

    print_report(&report);
    println!(
        "\nFingerprints indexed: {}",
        storage
            .count_fingerprints()
            .context("Failed to count fingerprints")?
    );

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown report
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Crawl Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.report_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    export_report(&storage, &config.output)?;

    println!("✓ Report exported to: {}", config.output.report_path);

    Ok(())
}

/// Handles the --check mode: canonicalizes each URL and runs the scope and policy filter
async fn handle_check(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let client = build_http_client(&config.user_agent)?;
    let robots = Arc::new(RobotsCache::new(client));
    let filter = ScopeFilter::new(&config.scope, robots);

    for raw in urls {
        let canonical = match Url::parse(raw)
            .map_err(anyhow::Error::from)
            .and_then(|base| canonicalize(&base, raw).map_err(anyhow::Error::from))
        {
            Ok(canonical) => canonical,
            Err(e) => {
                println!("REJECT  {}  ({})", raw, e);
                continue;
            }
        };

        match filter.check(&canonical).await {
            Ok(()) => println!("ACCEPT  {}", canonical),
            Err(reason) => println!("REJECT  {}  ({})", canonical, reason),
        }
    }

    Ok(())
}

/// Handles the --page mode: processes a saved page and prints the surviving links
async fn handle_page(
    config: Config,
    fresh: bool,
    page_path: &Path,
    url: &str,
    status: u16,
    content_type: &str,
) -> anyhow::Result<()> {
    let body = std::fs::read(page_path)
        .with_context(|| format!("Failed to read page {}", page_path.display()))?;

    let session = CrawlSession::open(config, fresh)?;
    let page = PageFetchResult::new(url, status, content_type, Some(body));

    match session.process_page(&page).await {
        PageOutcome::Skipped(reason) => println!("SKIPPED  {} ({})", url, reason),
        PageOutcome::Rejected(reason) => println!("REJECTED {} ({})", url, reason),
        PageOutcome::Accepted {
            word_count,
            links,
            fingerprint_saved,
        } => {
            println!("ACCEPTED {} ({} words, {} links)", url, word_count, links.len());
            if !fingerprint_saved {
                println!("  warning: fingerprint not saved, a restart may re-admit this page");
            }
            for link in links {
                println!("  {}", link);
            }
        }
    }

    println!();
    let report = CrawlReport::from_stats(&session.stats(), session.config().output.top_words);
    print_report(&report);

    Ok(())
}
