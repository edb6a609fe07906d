use serde::Deserialize;

/// Main configuration structure for Crawl-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub scope: ScopeConfig,
    pub content: ContentConfig,
    pub output: OutputConfig,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Crawl boundary configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Host suffixes that are inside the crawl (e.g. ".ics.uci.edu")
    #[serde(rename = "allowed-suffixes")]
    pub allowed_suffixes: Vec<String>,

    /// `authority + path` prefixes allowed on hosts outside the suffix list
    #[serde(rename = "allowed-prefixes", default)]
    pub allowed_prefixes: Vec<String>,

    /// Suffix whose subdomains are counted in the statistics
    #[serde(rename = "primary-suffix")]
    pub primary_suffix: String,

    /// Agent name used when consulting robots.txt
    #[serde(rename = "robots-agent", default = "default_robots_agent")]
    pub robots_agent: String,
}

/// Content validation policy
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Path to the stop-word list
    #[serde(rename = "stop-words-path")]
    pub stop_words_path: String,

    /// Minimum number of tokens left after stop-word removal
    #[serde(rename = "min-tokens", default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Minimum ratio of distinct tokens to total tokens
    #[serde(rename = "min-diversity", default = "default_min_diversity")]
    pub min_diversity: f64,

    /// Largest Hamming distance at which two fingerprints are near-duplicates
    #[serde(rename = "max-hamming-distance", default = "default_max_hamming_distance")]
    pub max_hamming_distance: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Number of most common words listed in the report
    #[serde(rename = "top-words", default = "default_top_words")]
    pub top_words: usize,
}

fn default_robots_agent() -> String {
    "*".to_string()
}

fn default_min_tokens() -> usize {
    50
}

fn default_min_diversity() -> f64 {
    0.2
}

fn default_max_hamming_distance() -> u32 {
    3
}

fn default_top_words() -> usize {
    50
}
