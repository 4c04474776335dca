//! Database schema definitions
//!
//! This module contains the SQL schema for migrated content and the
//! reference data (licenses and subject tags) the legacy host used.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Abstract text, one row per inserted version
CREATE TABLE IF NOT EXISTS abstracts (
    abstractid INTEGER PRIMARY KEY AUTOINCREMENT,
    abstract TEXT NOT NULL
);

-- Licenses content may be published under
CREATE TABLE IF NOT EXISTS licenses (
    licenseid INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE
);

-- One row per (content identifier, version)
CREATE TABLE IF NOT EXISTS modules (
    module_ident INTEGER PRIMARY KEY AUTOINCREMENT,
    portal_type TEXT NOT NULL CHECK (portal_type IN ('Module', 'Collection')),
    moduleid TEXT NOT NULL,
    version TEXT NOT NULL,
    name TEXT NOT NULL,
    created TEXT NOT NULL,
    revised TEXT NOT NULL,
    abstractid INTEGER NOT NULL REFERENCES abstracts(abstractid),
    licenseid INTEGER NOT NULL REFERENCES licenses(licenseid),
    doctype TEXT NOT NULL DEFAULT '',
    submitter TEXT NOT NULL DEFAULT '',
    submitlog TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL,
    UNIQUE(moduleid, version)
);

CREATE INDEX IF NOT EXISTS idx_modules_moduleid ON modules(moduleid);

-- Ordered authors, maintainers and licensors
CREATE TABLE IF NOT EXISTS module_roles (
    module_ident INTEGER NOT NULL REFERENCES modules(module_ident),
    role TEXT NOT NULL,
    position INTEGER NOT NULL,
    person TEXT NOT NULL,
    PRIMARY KEY (module_ident, role, position)
);

-- Content-addressed file payloads
CREATE TABLE IF NOT EXISTS files (
    fileid INTEGER PRIMARY KEY AUTOINCREMENT,
    sha256 TEXT NOT NULL UNIQUE,
    file BLOB NOT NULL
);

-- Files attached to a record under a filename
CREATE TABLE IF NOT EXISTS module_files (
    module_ident INTEGER NOT NULL REFERENCES modules(module_ident),
    fileid INTEGER NOT NULL REFERENCES files(fileid),
    filename TEXT NOT NULL,
    mimetype TEXT NOT NULL,
    UNIQUE(module_ident, filename)
);

CREATE INDEX IF NOT EXISTS idx_module_files_fileid ON module_files(fileid);

-- Subject tags
CREATE TABLE IF NOT EXISTS tags (
    tagid INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS moduletags (
    module_ident INTEGER NOT NULL REFERENCES modules(module_ident),
    tagid INTEGER NOT NULL REFERENCES tags(tagid),
    PRIMARY KEY (module_ident, tagid)
);

-- Free-form keywords, created on first use
CREATE TABLE IF NOT EXISTS keywords (
    keywordid INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS modulekeywords (
    module_ident INTEGER NOT NULL REFERENCES modules(module_ident),
    keywordid INTEGER NOT NULL REFERENCES keywords(keywordid),
    PRIMARY KEY (module_ident, keywordid)
);
"#;

/// Reference data published content refers to
pub const SEED_SQL: &str = r#"
INSERT OR IGNORE INTO licenses (name, url) VALUES
    ('Creative Commons Attribution License 1.0', 'http://creativecommons.org/licenses/by/1.0'),
    ('Creative Commons Attribution License 2.0', 'http://creativecommons.org/licenses/by/2.0/'),
    ('Creative Commons Attribution-ShareAlike License 2.0', 'http://creativecommons.org/licenses/by-sa/2.0/'),
    ('Creative Commons Attribution License 3.0', 'http://creativecommons.org/licenses/by/3.0/'),
    ('Creative Commons Attribution License 4.0', 'http://creativecommons.org/licenses/by/4.0/');

INSERT OR IGNORE INTO tags (tag) VALUES
    ('Arts'),
    ('Business'),
    ('Humanities'),
    ('Mathematics and Statistics'),
    ('Science and Technology'),
    ('Social Sciences');
"#;

/// Initializes the database schema and seeds reference data
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(SEED_SQL)?;
    Ok(())
}
