//! SQLite schema creation and versioning.

use std::time::Duration;

use medialib_core::OperationObject;
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema version mismatch: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// How long a writer waits for another connection's lock before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent, so it is safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    for object in OperationObject::asset_objects() {
        conn.execute_batch(&asset_table_sql(object.table()))?;
    }
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create an index database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// DDL for one asset table. Photos, audios and files share a column set.
fn asset_table_sql(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    file_id INTEGER PRIMARY KEY AUTOINCREMENT,
    data TEXT NOT NULL UNIQUE,
    size INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL,
    display_name TEXT NOT NULL,
    media_type INTEGER NOT NULL,
    mime_type TEXT NOT NULL DEFAULT '',
    owner_package TEXT NOT NULL DEFAULT '',
    date_added INTEGER NOT NULL DEFAULT 0,
    date_modified INTEGER NOT NULL DEFAULT 0,
    date_taken INTEGER NOT NULL DEFAULT 0,
    time_pending INTEGER NOT NULL DEFAULT 0,
    date_trashed INTEGER NOT NULL DEFAULT 0,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    hidden INTEGER NOT NULL DEFAULT 0,
    relative_path TEXT NOT NULL DEFAULT '',
    virtual_path TEXT NOT NULL DEFAULT '',
    unique_number INTEGER NOT NULL,
    api_type INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_{table}_path_name ON {table}(relative_path, display_name);
CREATE INDEX IF NOT EXISTS idx_{table}_pending ON {table}(time_pending);
"#
    )
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Last issued unique number per media kind
CREATE TABLE IF NOT EXISTS asset_unique_number (
    media_type TEXT PRIMARY KEY,
    unique_number INTEGER NOT NULL DEFAULT 0
);
INSERT OR IGNORE INTO asset_unique_number (media_type, unique_number) VALUES
    ('image', 0), ('video', 0), ('audio', 0), ('file', 0);

-- Logical albums
CREATE TABLE IF NOT EXISTS albums (
    album_id INTEGER PRIMARY KEY AUTOINCREMENT,
    album_name TEXT NOT NULL,
    relative_path TEXT NOT NULL UNIQUE,
    date_added INTEGER NOT NULL DEFAULT 0,
    date_modified INTEGER NOT NULL DEFAULT 0
);
"#;
