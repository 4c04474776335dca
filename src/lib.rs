//! Legacy-Populate: migrates legacy modules and collections into a relational store
//!
//! This crate discovers every version of a legacy content identifier, fetches
//! and caches the source documents, extracts their metadata, and populates a
//! SQLite database exactly once per (identifier, version), walking collection
//! membership and module resource files depth-first.

pub mod cache;
pub mod config;
pub mod content;
pub mod extract;
pub mod populate;
pub mod remote;
pub mod resolver;
pub mod storage;

use thiserror::Error;

/// Main error type for population runs
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("Invalid content identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        source: extract::ExtractError,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Collection cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for population operations
pub type Result<T> = std::result::Result<T, PopulateError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{DocumentCache, MemoryCache, SqliteCache};
pub use config::Config;
pub use content::{classify, primary_filename, ContentId, ContentType};
pub use populate::{Outcome, Populated, Populator};
pub use remote::RemoteHost;
pub use resolver::{Resolver, Revision, Revisions};
pub use storage::{Backend, Ident, SqliteBackend};
