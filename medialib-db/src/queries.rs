//! Read-only queries over assets and albums.

use medialib_core::{
    Album, ApiVersion, FileAsset, MediaType, OperationObject, Value, columns,
};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::operations::{OperationError, to_sql_value};

fn select_assets(object: OperationObject) -> String {
    format!("SELECT {} FROM {}", columns::ALL.join(", "), object.table())
}

fn asset_from_row(row: &Row) -> rusqlite::Result<FileAsset> {
    let media_type_raw: i32 = row.get(columns::MEDIA_TYPE)?;
    let media_type = MediaType::from_i32(media_type_raw).ok_or(
        rusqlite::Error::IntegralValueOutOfRange(5, i64::from(media_type_raw)),
    )?;
    let api_raw: i32 = row.get(columns::API_TYPE)?;
    let api_type = ApiVersion::from_mask(api_raw).ok_or(
        rusqlite::Error::IntegralValueOutOfRange(18, i64::from(api_raw)),
    )?;
    Ok(FileAsset {
        file_id: row.get(columns::FILE_ID)?,
        data: row.get(columns::DATA)?,
        size: row.get(columns::SIZE)?,
        title: row.get(columns::TITLE)?,
        display_name: row.get(columns::DISPLAY_NAME)?,
        media_type,
        mime_type: row.get(columns::MIME_TYPE)?,
        owner_package: row.get(columns::OWNER_PACKAGE)?,
        date_added: row.get(columns::DATE_ADDED)?,
        date_modified: row.get(columns::DATE_MODIFIED)?,
        date_taken: row.get(columns::DATE_TAKEN)?,
        time_pending: row.get(columns::TIME_PENDING)?,
        date_trashed: row.get(columns::DATE_TRASHED)?,
        is_favorite: row.get(columns::IS_FAVORITE)?,
        hidden: row.get(columns::HIDDEN)?,
        relative_path: row.get(columns::RELATIVE_PATH)?,
        virtual_path: row.get(columns::VIRTUAL_PATH)?,
        unique_number: row.get(columns::UNIQUE_NUMBER)?,
        api_type,
    })
}

fn album_from_row(row: &Row) -> rusqlite::Result<Album> {
    Ok(Album {
        album_id: row.get(0)?,
        album_name: row.get(1)?,
        relative_path: row.get(2)?,
        date_added: row.get(3)?,
        date_modified: row.get(4)?,
    })
}

// ── Assets ──────────────────────────────────────────────────────────────────

/// Look up one asset by id.
pub fn get_asset(
    conn: &Connection,
    object: OperationObject,
    file_id: i64,
) -> Result<Option<FileAsset>, OperationError> {
    conn.query_row(
        &format!("{} WHERE file_id = ?1", select_assets(object)),
        [file_id],
        asset_from_row,
    )
    .optional()
    .map_err(Into::into)
}

/// Query assets with an optional where clause using `?N` placeholders bound
/// to `args`. Results are ordered by `file_id`.
pub fn query_assets(
    conn: &Connection,
    object: OperationObject,
    where_clause: Option<&str>,
    args: &[Value],
) -> Result<Vec<FileAsset>, OperationError> {
    let mut sql = select_assets(object);
    if let Some(clause) = where_clause.filter(|c| !c.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
    sql.push_str(" ORDER BY file_id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(args.iter().map(to_sql_value)),
        asset_from_row,
    )?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Find a non-trashed legacy asset with the same logical name, ignoring
/// `exclude_id`. Returns its `file_id`.
pub fn find_legacy_name_conflict(
    conn: &Connection,
    object: OperationObject,
    relative_path: &str,
    display_name: &str,
    exclude_id: Option<i64>,
) -> Result<Option<i64>, OperationError> {
    conn.query_row(
        &format!(
            "SELECT file_id FROM {} WHERE relative_path = ?1 AND display_name = ?2
                 AND api_type = ?3 AND date_trashed = 0 AND file_id != ?4
             LIMIT 1",
            object.table()
        ),
        rusqlite::params![
            relative_path,
            display_name,
            ApiVersion::Legacy.mask(),
            exclude_id.unwrap_or(0),
        ],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Find a non-trashed legacy asset below `old_prefix` whose logical name
/// would collide with another non-trashed legacy asset once the prefix is
/// replaced by `new_prefix`. Returns the moving row's `file_id` and its new
/// relative path.
pub fn find_prefix_move_conflict(
    conn: &Connection,
    object: OperationObject,
    old_prefix: &str,
    new_prefix: &str,
) -> Result<Option<(i64, String)>, OperationError> {
    conn.query_row(
        &format!(
            "SELECT m.file_id, ?2 || substr(m.relative_path, ?3 + 1)
             FROM {t} m JOIN {t} o
                 ON o.display_name = m.display_name
                AND o.relative_path = ?2 || substr(m.relative_path, ?3 + 1)
             WHERE substr(m.relative_path, 1, ?3) = ?1
                 AND m.api_type = ?4 AND m.date_trashed = 0
                 AND o.api_type = ?4 AND o.date_trashed = 0
                 AND o.file_id != m.file_id
             LIMIT 1",
            t = object.table()
        ),
        rusqlite::params![
            old_prefix,
            new_prefix,
            old_prefix.chars().count() as i64,
            ApiVersion::Legacy.mask(),
        ],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(Into::into)
}

/// Count non-trashed assets whose relative path starts with `prefix`,
/// across every asset table.
pub fn count_live_assets_under(conn: &Connection, prefix: &str) -> Result<i64, OperationError> {
    let len = prefix.chars().count() as i64;
    let mut total = 0;
    for object in OperationObject::asset_objects() {
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE substr(relative_path, 1, ?2) = ?1
                     AND date_trashed = 0",
                object.table()
            ),
            rusqlite::params![prefix, len],
            |row| row.get(0),
        )?;
        total += count;
    }
    Ok(total)
}

/// Last issued unique number for a kind key, 0 if none issued.
pub fn current_unique_number(conn: &Connection, kind_key: &str) -> Result<i64, OperationError> {
    conn.query_row(
        "SELECT unique_number FROM asset_unique_number WHERE media_type = ?1",
        [kind_key],
        |row| row.get(0),
    )
    .optional()
    .map(|n| n.unwrap_or(0))
    .map_err(Into::into)
}

// ── Albums ──────────────────────────────────────────────────────────────────

const SELECT_ALBUMS: &str =
    "SELECT album_id, album_name, relative_path, date_added, date_modified FROM albums";

pub fn get_album(conn: &Connection, album_id: i64) -> Result<Option<Album>, OperationError> {
    conn.query_row(
        &format!("{SELECT_ALBUMS} WHERE album_id = ?1"),
        [album_id],
        album_from_row,
    )
    .optional()
    .map_err(Into::into)
}

pub fn find_album_by_path(
    conn: &Connection,
    relative_path: &str,
) -> Result<Option<Album>, OperationError> {
    conn.query_row(
        &format!("{SELECT_ALBUMS} WHERE relative_path = ?1"),
        [relative_path],
        album_from_row,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_albums(conn: &Connection) -> Result<Vec<Album>, OperationError> {
    let mut stmt = conn.prepare(&format!("{SELECT_ALBUMS} ORDER BY album_id"))?;
    let rows = stmt.query_map([], album_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
