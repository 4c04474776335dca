//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Backend trait.
//! The individual insert steps are plain functions over a connection so the
//! same code runs standalone and inside the insert transaction.

use crate::content::{ContentType, ContentUnit, Metadata, PRIMARY_MIME_TYPE};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Backend, StorageError, StorageResult};
use crate::storage::{content_hash, FileAssociation, Ident, RecordSummary};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

/// SQLite persistence backend
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteBackend)` - Database opened with schema and reference data in place
    /// * `Err(StorageError)` - Failed to open or initialize the database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Adds a license if its URL is not known yet and returns its id
    pub fn seed_license(&mut self, name: &str, url: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO licenses (name, url) VALUES (?1, ?2)",
            params![name, url],
        )?;
        find_license_id(&self.conn, url)
    }

    /// Adds a subject tag if it is not known yet and returns its id
    pub fn seed_tag(&mut self, tag: &str) -> StorageResult<i64> {
        self.conn
            .execute("INSERT OR IGNORE INTO tags (tag) VALUES (?1)", params![tag])?;
        let id = self
            .conn
            .query_row("SELECT tagid FROM tags WHERE tag = ?1", params![tag], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    /// Total number of persisted records
    pub fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM modules", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of distinct stored file payloads
    pub fn count_files(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Files attached to a record, ordered by filename
    pub fn file_associations(&self, ident: Ident) -> StorageResult<Vec<FileAssociation>> {
        let mut stmt = self.conn.prepare(
            "SELECT fileid, filename, mimetype FROM module_files
             WHERE module_ident = ?1 ORDER BY filename",
        )?;

        let files = stmt
            .query_map(params![ident], |row| {
                Ok(FileAssociation {
                    fileid: row.get(0)?,
                    filename: row.get(1)?,
                    mimetype: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(files)
    }

    /// Keywords of a record, sorted
    pub fn keywords(&self, ident: Ident) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT k.word FROM keywords k
             JOIN modulekeywords mk ON mk.keywordid = k.keywordid
             WHERE mk.module_ident = ?1 ORDER BY k.word",
        )?;
        let words = stmt
            .query_map(params![ident], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    /// Subject tags of a record, sorted
    pub fn subjects(&self, ident: Ident) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag FROM tags t
             JOIN moduletags mt ON mt.tagid = t.tagid
             WHERE mt.module_ident = ?1 ORDER BY t.tag",
        )?;
        let tags = stmt
            .query_map(params![ident], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// People holding `role` on a record, in document order
    pub fn roles(&self, ident: Ident, role: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT person FROM module_roles
             WHERE module_ident = ?1 AND role = ?2 ORDER BY position",
        )?;
        let people = stmt
            .query_map(params![ident, role], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(people)
    }
}

impl Backend for SqliteBackend {
    // ===== Existence =====

    fn find_record(&self, content_id: &str, version: &str) -> StorageResult<Option<Ident>> {
        let ident = self
            .conn
            .query_row(
                "SELECT module_ident FROM modules WHERE moduleid = ?1 AND version = ?2",
                params![content_id, version],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ident)
    }

    fn record_type(&self, ident: Ident) -> StorageResult<ContentType> {
        Ok(self.record(ident)?.portal_type)
    }

    fn record_version(&self, ident: Ident) -> StorageResult<String> {
        Ok(self.record(ident)?.version)
    }

    fn record(&self, ident: Ident) -> StorageResult<RecordSummary> {
        let row: Option<(String, String, String, String)> = self
            .conn
            .query_row(
                "SELECT moduleid, version, name, portal_type FROM modules WHERE module_ident = ?1",
                params![ident],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let (moduleid, version, name, portal_type) =
            row.ok_or(StorageError::RecordNotFound(ident))?;

        Ok(RecordSummary {
            ident,
            moduleid,
            version,
            name,
            portal_type: parse_portal_type(&portal_type)?,
        })
    }

    // ===== Insert Steps =====

    fn insert_abstract(&mut self, text: &str) -> StorageResult<i64> {
        insert_abstract(&self.conn, text)
    }

    fn find_license_id(&self, url: &str) -> StorageResult<i64> {
        find_license_id(&self.conn, url)
    }

    fn insert_record(
        &mut self,
        metadata: &Metadata,
        abstract_id: i64,
        license_id: i64,
    ) -> StorageResult<(Ident, ContentType)> {
        let tx = self.conn.transaction()?;
        let inserted = insert_record(&tx, metadata, abstract_id, license_id)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn find_or_create_file_blob(&mut self, bytes: &[u8], hash: &str) -> StorageResult<i64> {
        find_or_create_file_blob(&self.conn, bytes, hash)
    }

    fn insert_file_association(
        &mut self,
        ident: Ident,
        file_id: i64,
        filename: &str,
        mime_type: &str,
    ) -> StorageResult<()> {
        insert_file_association(&self.conn, ident, file_id, filename, mime_type)
    }

    fn insert_subject_association(&mut self, ident: Ident, subject: &str) -> StorageResult<()> {
        insert_subject_association(&self.conn, ident, subject)
    }

    fn find_or_create_keyword(&mut self, word: &str) -> StorageResult<i64> {
        find_or_create_keyword(&self.conn, word)
    }

    fn insert_keyword_association(&mut self, ident: Ident, keyword_id: i64) -> StorageResult<()> {
        insert_keyword_association(&self.conn, ident, keyword_id)
    }

    // ===== Transactions =====

    fn insert_content(
        &mut self,
        unit: &ContentUnit,
        document: &[u8],
    ) -> StorageResult<(Ident, ContentType)> {
        // Dropping the transaction on any early return rolls everything back.
        let tx = self.conn.transaction()?;

        let abstract_id = insert_abstract(&tx, &unit.abstract_text)?;
        let license_id = find_license_id(&tx, &unit.license_url)?;
        let (ident, content_type) = insert_record(&tx, &unit.metadata, abstract_id, license_id)?;

        let file_id = find_or_create_file_blob(&tx, document, &content_hash(document))?;
        insert_file_association(
            &tx,
            ident,
            file_id,
            content_type.primary_filename(),
            PRIMARY_MIME_TYPE,
        )?;

        for subject in &unit.subjects {
            insert_subject_association(&tx, ident, subject)?;
        }

        for word in &unit.keywords {
            let keyword_id = find_or_create_keyword(&tx, word)?;
            insert_keyword_association(&tx, ident, keyword_id)?;
        }

        tx.commit()?;
        Ok((ident, content_type))
    }

    fn attach_file(
        &mut self,
        ident: Ident,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;
        let file_id = find_or_create_file_blob(&tx, bytes, &content_hash(bytes))?;
        insert_file_association(&tx, ident, file_id, filename, mime_type)?;
        tx.commit()?;
        Ok(file_id)
    }

    // ===== Read Back =====

    fn primary_document(&self, ident: Ident) -> StorageResult<Vec<u8>> {
        let filename = self.record_type(ident)?.primary_filename();
        let file = self
            .conn
            .query_row(
                "SELECT f.file FROM files f
                 JOIN module_files mf ON mf.fileid = f.fileid
                 WHERE mf.module_ident = ?1 AND mf.filename = ?2",
                params![ident, filename],
                |row| row.get(0),
            )
            .optional()?;

        file.ok_or_else(|| {
            StorageError::Corrupt(format!("record {} has no {}", ident, filename))
        })
    }

    fn recorded_filenames(&self, ident: Ident) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filename FROM module_files WHERE module_ident = ?1")?;
        let names = stmt
            .query_map(params![ident], |row| row.get(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }
}

fn parse_portal_type(value: &str) -> StorageResult<ContentType> {
    ContentType::from_db_string(value)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown portal_type '{}'", value)))
}

/// Reports unique-constraint failures as their own error kind
fn constraint_error(err: rusqlite::Error, context: String) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(context)
        }
        other => StorageError::Sqlite(other),
    }
}

fn insert_abstract(conn: &Connection, text: &str) -> StorageResult<i64> {
    conn.execute("INSERT INTO abstracts (abstract) VALUES (?1)", params![text])?;
    Ok(conn.last_insert_rowid())
}

fn find_license_id(conn: &Connection, url: &str) -> StorageResult<i64> {
    let id = conn
        .query_row(
            "SELECT licenseid FROM licenses WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )
        .optional()?;
    id.ok_or_else(|| StorageError::UnknownLicense(url.to_string()))
}

fn insert_record(
    conn: &Connection,
    metadata: &Metadata,
    abstract_id: i64,
    license_id: i64,
) -> StorageResult<(Ident, ContentType)> {
    let (ident, portal_type): (Ident, String) = conn
        .query_row(
            "INSERT INTO modules
             (portal_type, moduleid, version, name, created, revised, abstractid, licenseid, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING module_ident, portal_type",
            params![
                metadata.portal_type.to_db_string(),
                metadata.moduleid,
                metadata.version,
                metadata.name,
                metadata.created,
                metadata.revised,
                abstract_id,
                license_id,
                metadata.language,
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| {
            constraint_error(
                e,
                format!("{} version {} already exists", metadata.moduleid, metadata.version),
            )
        })?;

    insert_roles(conn, ident, "author", &metadata.authors)?;
    insert_roles(conn, ident, "maintainer", &metadata.maintainers)?;
    insert_roles(conn, ident, "licensor", &metadata.licensors)?;

    Ok((ident, parse_portal_type(&portal_type)?))
}

fn insert_roles(conn: &Connection, ident: Ident, role: &str, people: &[String]) -> StorageResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO module_roles (module_ident, role, position, person) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, person) in people.iter().enumerate() {
        stmt.execute(params![ident, role, position as i64, person])?;
    }
    Ok(())
}

/// Single upsert statement; an existing blob keeps its original bytes
fn find_or_create_file_blob(conn: &Connection, bytes: &[u8], hash: &str) -> StorageResult<i64> {
    let id = conn.query_row(
        "INSERT INTO files (sha256, file) VALUES (?1, ?2)
         ON CONFLICT(sha256) DO UPDATE SET sha256 = excluded.sha256
         RETURNING fileid",
        params![hash, bytes],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn insert_file_association(
    conn: &Connection,
    ident: Ident,
    file_id: i64,
    filename: &str,
    mime_type: &str,
) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO module_files (module_ident, fileid, filename, mimetype) VALUES (?1, ?2, ?3, ?4)",
        params![ident, file_id, filename, mime_type],
    )
    .map_err(|e| constraint_error(e, format!("record {} already has {}", ident, filename)))?;
    Ok(())
}

fn insert_subject_association(conn: &Connection, ident: Ident, subject: &str) -> StorageResult<()> {
    let tag_id: i64 = conn
        .query_row("SELECT tagid FROM tags WHERE tag = ?1", params![subject], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or_else(|| StorageError::UnknownTag(subject.to_string()))?;

    conn.execute(
        "INSERT INTO moduletags (module_ident, tagid) VALUES (?1, ?2)",
        params![ident, tag_id],
    )?;
    Ok(())
}

fn find_or_create_keyword(conn: &Connection, word: &str) -> StorageResult<i64> {
    let id = conn.query_row(
        "INSERT INTO keywords (word) VALUES (?1)
         ON CONFLICT(word) DO UPDATE SET word = excluded.word
         RETURNING keywordid",
        params![word],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn insert_keyword_association(conn: &Connection, ident: Ident, keyword_id: i64) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO modulekeywords (module_ident, keywordid) VALUES (?1, ?2)",
        params![ident, keyword_id],
    )?;
    Ok(())
}
