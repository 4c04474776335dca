//! Storage module for persisting migrated content
//!
//! This module handles all database operations for population, including:
//! - SQLite database initialization, schema, and reference data seeding
//! - Existence checks on (content identifier, version)
//! - The all-or-nothing insert of one content version
//! - Content-addressed, deduplicated file storage

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteBackend;
pub use traits::{Backend, StorageError, StorageResult};

use crate::content::ContentType;
use sha2::{Digest, Sha256};

/// Backend-generated identity of a persisted (identifier, version)
pub type Ident = i64;

/// Summary of a persisted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub ident: Ident,
    pub moduleid: String,
    pub version: String,
    pub name: String,
    pub portal_type: ContentType,
}

/// A file attached to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAssociation {
    pub fileid: i64,
    pub filename: String,
    pub mimetype: String,
}

/// Hex-encoded SHA-256 of a file payload, the key files are deduplicated on
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
