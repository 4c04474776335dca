//! Persistent document cache
//!
//! Maps a source URL to the raw text previously fetched from it, so repeated
//! runs do not refetch version history pages and source documents. Presence
//! in the cache says nothing about whether the text is usable: consumers that
//! fail to extract from a cached document invalidate it, and the next lookup
//! misses and refetches.

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use thiserror::Error;

/// Errors raised by cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store of fetched documents keyed by URL
///
/// Methods take `&self` so a single cache can be shared by the resolver and
/// every sequence it hands out.
pub trait DocumentCache {
    /// Looks up a document; a miss is `Ok(None)`
    fn get(&self, url: &str) -> CacheResult<Option<String>>;

    /// Stores a document, replacing any previous entry for the URL
    fn put(&self, url: &str, document: &str) -> CacheResult<()>;

    /// Removes the entry for the URL; removing a missing entry is not an error
    fn invalidate(&self, url: &str) -> CacheResult<()>;
}
