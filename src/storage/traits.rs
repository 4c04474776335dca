//! Storage traits and error types
//!
//! This module defines the interface the population engine needs from a
//! persistence backend, independent of the schema behind it.

use crate::content::{ContentId, ContentType, ContentUnit, Metadata};
use crate::extract::extract_collection_members;
use crate::storage::{Ident, RecordSummary};
use crate::{PopulateError, Result};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No license matches URL: {0}")]
    UnknownLicense(String),

    #[error("No tag matches subject: {0}")]
    UnknownTag(String),

    #[error("Record not found: {0}")]
    RecordNotFound(Ident),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Corrupt stored data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Trait for persistence backend implementations
///
/// The fine-grained operations each run on their own. `insert_content` and
/// `attach_file` compose them into a single transaction that either commits
/// completely or leaves nothing behind.
pub trait Backend {
    // ===== Existence =====

    /// Finds the record persisted for a (content identifier, version) pair
    fn find_record(&self, content_id: &str, version: &str) -> StorageResult<Option<Ident>>;

    /// Gets the stored type of a record
    fn record_type(&self, ident: Ident) -> StorageResult<ContentType>;

    /// Gets the stored version label of a record
    fn record_version(&self, ident: Ident) -> StorageResult<String>;

    /// Gets a summary of a record
    fn record(&self, ident: Ident) -> StorageResult<RecordSummary>;

    // ===== Insert Steps =====

    fn insert_abstract(&mut self, text: &str) -> StorageResult<i64>;

    /// Looks up a license by URL, failing with `UnknownLicense` on a miss
    fn find_license_id(&self, url: &str) -> StorageResult<i64>;

    /// Inserts the core metadata row, returning the new ident and its stored type
    fn insert_record(
        &mut self,
        metadata: &Metadata,
        abstract_id: i64,
        license_id: i64,
    ) -> StorageResult<(Ident, ContentType)>;

    /// Returns the blob with this hash, storing `bytes` only if none exists
    fn find_or_create_file_blob(&mut self, bytes: &[u8], hash: &str) -> StorageResult<i64>;

    fn insert_file_association(
        &mut self,
        ident: Ident,
        file_id: i64,
        filename: &str,
        mime_type: &str,
    ) -> StorageResult<()>;

    /// Tags a record with a pre-seeded subject, failing with `UnknownTag` on a miss
    fn insert_subject_association(&mut self, ident: Ident, subject: &str) -> StorageResult<()>;

    fn find_or_create_keyword(&mut self, word: &str) -> StorageResult<i64>;

    fn insert_keyword_association(&mut self, ident: Ident, keyword_id: i64) -> StorageResult<()>;

    // ===== Transactions =====

    /// Persists one content version and its primary document atomically
    fn insert_content(
        &mut self,
        unit: &ContentUnit,
        document: &[u8],
    ) -> StorageResult<(Ident, ContentType)>;

    /// Stores a resource file and associates it with a record atomically
    fn attach_file(
        &mut self,
        ident: Ident,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> StorageResult<i64>;

    // ===== Read Back =====

    /// The stored primary document of a record
    fn primary_document(&self, ident: Ident) -> StorageResult<Vec<u8>>;

    /// Filenames already associated with a record
    fn recorded_filenames(&self, ident: Ident) -> StorageResult<HashSet<String>>;

    /// Member identifiers of a stored collection, in document order
    fn child_content_ids(&self, ident: Ident) -> Result<Vec<ContentId>> {
        let document = String::from_utf8(self.primary_document(ident)?).map_err(|e| {
            StorageError::Corrupt(format!("primary document of {} is not UTF-8: {}", ident, e))
        })?;

        let members = extract_collection_members(&document).map_err(|source| {
            PopulateError::Extraction {
                url: format!("record:{}", ident),
                source,
            }
        })?;

        members.iter().map(|member| ContentId::parse(member)).collect()
    }
}
