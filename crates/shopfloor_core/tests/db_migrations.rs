use shopfloor_core::db::{migrations, open_db, open_db_in_memory, DbError};

#[test]
fn fresh_database_lands_on_latest_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, migrations::latest_version());
    assert!(migrations::latest_version() >= 1);
}

#[test]
fn migrations_create_expected_tables() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .map(|row| row.unwrap())
        .collect();

    for expected in [
        "orders",
        "items",
        "item_processes",
        "process_completions",
        "progress_history",
    ] {
        assert!(tables.iter().any(|name| name == expected), "missing {expected}");
    }
}

#[test]
fn reopening_a_migrated_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("migrate.sqlite3");

    drop(open_db(&db_path).unwrap());
    let conn = open_db(&db_path).unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, migrations::latest_version());
}

#[test]
fn newer_schema_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("future.sqlite3");

    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    }

    let err = open_db(&db_path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
}
