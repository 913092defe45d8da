//! SQLite persistence layer for the media index.
//!
//! Provides schema creation, the shared store handle with its transaction
//! guard, write operations and queries, backed by SQLite (via rusqlite with
//! the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use operations::{
    NewAsset, OperationError, delete_album, delete_asset, finish_pending, insert_album,
    insert_asset, next_unique_number, rename_album, rewrite_album_path_prefix,
    rewrite_relative_path_prefix, set_date_trashed, update_asset_columns,
};
pub use queries::{
    count_live_assets_under, current_unique_number, find_album_by_path,
    find_legacy_name_conflict, find_prefix_move_conflict, get_album, get_asset, list_albums,
    query_assets,
};
pub use schema::{SchemaError, open_database, open_memory};
pub use rusqlite::Connection;
pub use store::{IndexStore, TransactionGuard};

impl From<SchemaError> for medialib_core::MediaLibError {
    fn from(e: SchemaError) -> Self {
        let code = match &e {
            SchemaError::Sqlite(rusqlite::Error::SqliteFailure(f, _)) => f.extended_code,
            _ => -1,
        };
        medialib_core::MediaLibError::db(code, e.to_string())
    }
}
