//! SQLite-backed document cache that survives across runs

use crate::cache::{CacheResult, DocumentCache};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const CACHE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    url TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);
"#;

/// Document cache stored in its own SQLite file
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Opens or creates the cache database at `path`
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.execute_batch(CACHE_SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Creates a cache that disappears with the process
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CACHE_SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Number of cached documents
    pub fn len(&self) -> CacheResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl DocumentCache for SqliteCache {
    fn get(&self, url: &str) -> CacheResult<Option<String>> {
        let document = self
            .conn
            .query_row(
                "SELECT content FROM documents WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(document)
    }

    fn put(&self, url: &str, document: &str) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (url, content, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET content = excluded.content, fetched_at = excluded.fetched_at",
            params![url, document, now],
        )?;
        Ok(())
    }

    fn invalidate(&self, url: &str) -> CacheResult<()> {
        self.conn
            .execute("DELETE FROM documents WHERE url = ?1", params![url])?;
        Ok(())
    }
}
