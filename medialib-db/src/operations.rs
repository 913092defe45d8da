//! Write operations on the index: unique numbers, assets and albums.

use medialib_core::{
    ApiVersion, MediaKind, MediaLibError, MediaType, OperationObject, Value, columns,
};
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// SQLite extended result code, or -1 for failures outside SQLite.
    pub fn sqlite_code(&self) -> i32 {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => e.extended_code,
            _ => -1,
        }
    }
}

impl From<OperationError> for MediaLibError {
    fn from(e: OperationError) -> Self {
        MediaLibError::db(e.sqlite_code(), e.to_string())
    }
}

/// Convert a command value into an SQLite value.
pub fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Int32(v) => Sql::Integer(i64::from(*v)),
        Value::Int64(v) => Sql::Integer(*v),
        Value::Double(v) => Sql::Real(*v),
        Value::Text(s) => Sql::Text(s.clone()),
    }
}

// ── Unique Numbers ──────────────────────────────────────────────────────────

/// Atomically increment and return the unique number for `kind`.
pub fn next_unique_number(conn: &Connection, kind: MediaKind) -> Result<i64, OperationError> {
    let number = conn.query_row(
        "UPDATE asset_unique_number SET unique_number = unique_number + 1
         WHERE media_type = ?1
         RETURNING unique_number",
        [kind.key()],
        |row| row.get(0),
    );
    match number {
        Ok(n) => Ok(n),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(OperationError::not_found("unique number", kind.key()))
        }
        Err(e) => Err(e.into()),
    }
}

// ── Asset Operations ────────────────────────────────────────────────────────

/// A row about to be inserted into an asset table.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub data: String,
    pub title: String,
    pub display_name: String,
    pub media_type: MediaType,
    pub mime_type: String,
    pub owner_package: String,
    pub date_added: i64,
    pub time_pending: i64,
    pub relative_path: String,
    pub virtual_path: String,
    pub unique_number: i64,
    pub api_type: ApiVersion,
}

/// Insert an asset row and return its `file_id`.
pub fn insert_asset(
    conn: &Connection,
    object: OperationObject,
    asset: &NewAsset,
) -> Result<i64, OperationError> {
    conn.execute(
        &format!(
            "INSERT INTO {} (data, size, title, display_name, media_type, mime_type,
                 owner_package, date_added, date_modified, time_pending, relative_path,
                 virtual_path, unique_number, api_type)
             VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10, ?11, ?12)",
            object.table()
        ),
        params![
            asset.data,
            asset.title,
            asset.display_name,
            asset.media_type.as_i32(),
            asset.mime_type,
            asset.owner_package,
            asset.date_added,
            asset.time_pending,
            asset.relative_path,
            asset.virtual_path,
            asset.unique_number,
            asset.api_type.mask(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete an asset row. Deleting a missing row is an error.
pub fn delete_asset(
    conn: &Connection,
    object: OperationObject,
    file_id: i64,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE file_id = ?1", object.table()),
        [file_id],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found(object.table(), file_id));
    }
    Ok(())
}

/// Set arbitrary asset columns on one row.
///
/// Column names are checked against the asset column list before they are
/// spliced into SQL.
pub fn update_asset_columns(
    conn: &Connection,
    object: OperationObject,
    file_id: i64,
    values: &[(&str, Value)],
) -> Result<(), OperationError> {
    if values.is_empty() {
        return Ok(());
    }
    let mut assignments = Vec::with_capacity(values.len());
    let mut args = Vec::with_capacity(values.len() + 1);
    for (i, (column, value)) in values.iter().enumerate() {
        if !columns::is_asset_column(column) || *column == columns::FILE_ID {
            return Err(OperationError::UnknownColumn(column.to_string()));
        }
        assignments.push(format!("{} = ?{}", column, i + 1));
        args.push(to_sql_value(value));
    }
    args.push(rusqlite::types::Value::Integer(file_id));

    let sql = format!(
        "UPDATE {} SET {} WHERE file_id = ?{}",
        object.table(),
        assignments.join(", "),
        args.len()
    );
    let changed = conn.execute(&sql, rusqlite::params_from_iter(args))?;
    if changed == 0 {
        return Err(OperationError::not_found(object.table(), file_id));
    }
    Ok(())
}

/// Mark a pending asset as finished: clear `time_pending` and record the
/// size and modification time of its content.
pub fn finish_pending(
    conn: &Connection,
    object: OperationObject,
    file_id: i64,
    size: i64,
    now: i64,
) -> Result<(), OperationError> {
    update_asset_columns(
        conn,
        object,
        file_id,
        &[
            (columns::TIME_PENDING, Value::Int64(0)),
            (columns::SIZE, Value::Int64(size)),
            (columns::DATE_MODIFIED, Value::Int64(now)),
        ],
    )
}

/// Set (`Some(now)`) or clear (`None`) the trashed timestamp.
pub fn set_date_trashed(
    conn: &Connection,
    object: OperationObject,
    file_id: i64,
    trashed_at: Option<i64>,
) -> Result<(), OperationError> {
    update_asset_columns(
        conn,
        object,
        file_id,
        &[(columns::DATE_TRASHED, Value::Int64(trashed_at.unwrap_or(0)))],
    )
}

/// Rewrite the `relative_path` prefix of every legacy asset below `old_prefix`,
/// keeping `virtual_path` in step. Returns the number of rows changed.
pub fn rewrite_relative_path_prefix(
    conn: &Connection,
    object: OperationObject,
    old_prefix: &str,
    new_prefix: &str,
) -> Result<usize, OperationError> {
    let old_len = old_prefix.chars().count() as i64;
    let changed = conn.execute(
        &format!(
            "UPDATE {} SET
                 relative_path = ?2 || substr(relative_path, ?3 + 1),
                 virtual_path = ?2 || substr(relative_path, ?3 + 1) || display_name
             WHERE substr(relative_path, 1, ?3) = ?1 AND api_type = ?4",
            object.table()
        ),
        params![old_prefix, new_prefix, old_len, ApiVersion::Legacy.mask()],
    )?;
    Ok(changed)
}

// ── Album Operations ────────────────────────────────────────────────────────

pub fn insert_album(
    conn: &Connection,
    album_name: &str,
    relative_path: &str,
    now: i64,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO albums (album_name, relative_path, date_added, date_modified)
         VALUES (?1, ?2, ?3, ?3)",
        params![album_name, relative_path, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn rename_album(
    conn: &Connection,
    album_id: i64,
    album_name: &str,
    relative_path: &str,
    now: i64,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE albums SET album_name = ?2, relative_path = ?3, date_modified = ?4
         WHERE album_id = ?1",
        params![album_id, album_name, relative_path, now],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("album", album_id));
    }
    Ok(())
}

/// Rewrite the `relative_path` prefix of every album below `old_prefix`.
/// Returns the number of albums changed.
pub fn rewrite_album_path_prefix(
    conn: &Connection,
    old_prefix: &str,
    new_prefix: &str,
    now: i64,
) -> Result<usize, OperationError> {
    let changed = conn.execute(
        "UPDATE albums SET
             relative_path = ?2 || substr(relative_path, ?3 + 1),
             date_modified = ?4
         WHERE substr(relative_path, 1, ?3) = ?1",
        params![old_prefix, new_prefix, old_prefix.chars().count() as i64, now],
    )?;
    Ok(changed)
}

pub fn delete_album(conn: &Connection, album_id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM albums WHERE album_id = ?1", [album_id])?;
    if changed == 0 {
        return Err(OperationError::not_found("album", album_id));
    }
    Ok(())
}
