//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Crawl-Sieve database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Named running totals (unique page count)
CREATE TABLE IF NOT EXISTS counters (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL DEFAULT 0
);

-- The single longest accepted page
CREATE TABLE IF NOT EXISTS longest_page (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    url TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

-- Word occurrences across accepted pages
CREATE TABLE IF NOT EXISTS word_frequencies (
    word TEXT PRIMARY KEY,
    count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_word_frequencies_count ON word_frequencies(count);

-- Accepted pages per subdomain of the primary suffix
CREATE TABLE IF NOT EXISTS subdomains (
    authority TEXT PRIMARY KEY,
    count INTEGER NOT NULL DEFAULT 0
);

-- Near-duplicate index entries, append-only
CREATE TABLE IF NOT EXISTS fingerprints (
    page_key TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    fingerprint INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
