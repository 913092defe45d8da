use medialib_db::schema::{CURRENT_VERSION, create_schema, get_schema_version};
use medialib_db::{SchemaError, open_database, open_memory};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
    // Seeds are not duplicated
    let kinds: i32 = conn
        .query_row("SELECT COUNT(*) FROM asset_unique_number", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kinds, 4);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "asset_unique_number",
        "albums",
        "photos",
        "audios",
        "files",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table {table} missing");
    }
}

#[test]
fn unique_numbers_start_at_zero() {
    let conn = open_memory().unwrap();
    let total: i64 = conn
        .query_row(
            "SELECT SUM(unique_number) FROM asset_unique_number",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn file_database_uses_wal_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");
    {
        let conn = open_database(&path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
    let conn = open_database(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");
    {
        let conn = open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_VERSION + 1],
        )
        .unwrap();
    }
    assert!(matches!(
        open_database(&path),
        Err(SchemaError::VersionMismatch { .. })
    ));
}
