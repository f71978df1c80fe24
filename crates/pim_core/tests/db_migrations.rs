use pim_core::db::migrations::{current_version, latest_version};
use pim_core::db::{open_db, open_db_in_memory, open_existing_db, DbError};
use rusqlite::Connection;

const CATALOG_TABLES: &[&str] = &[
    "attributes",
    "families",
    "family_attributes",
    "family_variants",
    "variant_attribute_sets",
    "variant_attribute_set_members",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    for table in CATALOG_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO attributes (code, type) VALUES ('sku', 'identifier');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(current_version(&second).unwrap(), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM attributes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_existing_db_refuses_missing_file_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");

    match open_existing_db(&path).unwrap_err() {
        DbError::MissingDatabase(missing) => assert_eq!(missing, path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.exists());
}

#[test]
fn open_existing_db_reads_created_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    drop(open_db(&path).unwrap());

    let conn = open_existing_db(&path).unwrap();
    assert_eq!(current_version(&conn).unwrap(), latest_version());
}

#[test]
fn foreign_keys_guard_family_attributes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO families (code) VALUES ('shoes');", [])
        .unwrap();

    let result = conn.execute(
        "INSERT INTO family_attributes (family_code, attribute_code, sort_order)
         VALUES ('shoes', 'missing', 0);",
        [],
    );
    assert!(result.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
