//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{CrawlStats, LongestPage};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::CrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

const UNIQUE_PAGES: &str = "unique_pages";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Several instances may share one file; writers wait on each other for up to five
    /// seconds.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database, private to this instance
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn unique_pages(&self) -> StorageResult<u64> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM counters WHERE name = ?1",
                params![UNIQUE_PAGES],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or(0) as u64)
    }

    fn longest_page(&self) -> StorageResult<Option<LongestPage>> {
        let page = self
            .conn
            .query_row(
                "SELECT url, word_count FROM longest_page WHERE id = 1",
                [],
                |row| {
                    Ok(LongestPage {
                        url: row.get(0)?,
                        word_count: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }

    fn word_frequencies(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self.conn.prepare("SELECT word, count FROM word_frequencies")?;
        let words = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(words)
    }
}

impl Storage for SqliteStorage {
    // ===== Statistics =====

    fn load_stats(&self) -> StorageResult<CrawlStats> {
        Ok(CrawlStats {
            unique_pages: self.unique_pages()?,
            longest_page: self.longest_page()?,
            word_frequencies: self.word_frequencies()?,
            subdomains: self.subdomain_counts()?.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    fn increment_unique_pages(&mut self) -> StorageResult<u64> {
        self.conn.execute(
            "INSERT INTO counters (name, value) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1",
            params![UNIQUE_PAGES],
        )?;
        self.unique_pages()
    }

    fn save_longest_page(&mut self, page: &LongestPage) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO longest_page (id, url, word_count, recorded_at)
             VALUES (1, ?1, ?2, ?3)",
            params![page.url, page.word_count as i64, now],
        )?;
        Ok(())
    }

    fn add_word_counts(&mut self, counts: &HashMap<String, u64>) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO word_frequencies (word, count) VALUES (?1, ?2)
                 ON CONFLICT(word) DO UPDATE SET count = count + excluded.count",
            )?;
            for (word, count) in counts {
                stmt.execute(params![word, *count as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn increment_subdomain(&mut self, authority: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO subdomains (authority, count) VALUES (?1, 1)
             ON CONFLICT(authority) DO UPDATE SET count = count + 1",
            params![authority],
        )?;
        Ok(())
    }

    fn top_words(&self, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT word, count FROM word_frequencies ORDER BY count DESC, word ASC LIMIT ?1",
        )?;
        let words = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    fn subdomain_counts(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT authority, count FROM subdomains ORDER BY authority ASC")?;
        let subdomains = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subdomains)
    }

    // ===== Near-Duplicate Index =====

    fn insert_fingerprint(
        &mut self,
        page_key: &str,
        url: &str,
        fingerprint: u64,
    ) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        // SQLite integers are signed; the bit pattern is stored unchanged
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO fingerprints (page_key, url, fingerprint, indexed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![page_key, url, fingerprint as i64, now],
        )?;
        Ok(inserted > 0)
    }

    fn load_fingerprints(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT page_key, fingerprint FROM fingerprints ORDER BY rowid ASC")?;
        let entries = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn count_fingerprints(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fingerprints", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Maintenance =====

    fn clear_all(&mut self) -> StorageResult<()> {
        self.conn.execute_batch(
            "
            BEGIN;
            DELETE FROM counters;
            DELETE FROM longest_page;
            DELETE FROM word_frequencies;
            DELETE FROM subdomains;
            DELETE FROM fingerprints;
            COMMIT;
        ",
        )?;
        Ok(())
    }
}
