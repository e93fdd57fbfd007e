use catalog_core::db::migrations::latest_version;
use catalog_core::db::seed::seed_sample_data;
use catalog_core::db::{open_db, open_db_in_memory, DbError};
use chrono::Utc;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "access_controls",
        "agencies",
        "profiles",
        "profile_agencies",
        "listings",
        "listing_owners",
        "categories",
        "listing_types",
        "contact_types",
        "intents",
        "notifications",
        "notification_dismissals",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reopening_a_seeded_file_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let mut conn_first = open_db(&path).unwrap();
    seed_sample_data(&mut conn_first, Utc::now()).unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let notifications: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM notifications;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(notifications, 6);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn failed_migration_names_the_step_and_keeps_the_old_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("half.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notifications (legacy TEXT);
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::Migration { version, name, .. } => {
            assert_eq!(*version, 2);
            assert_eq!(*name, "notifications");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("catalog migration 2 (notifications) failed"));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
}

#[test]
fn notification_cannot_target_listing_and_agency_at_once() {
    let mut conn = open_db_in_memory().unwrap();
    seed_sample_data(&mut conn, Utc::now()).unwrap();

    let result = conn.execute(
        "INSERT INTO notifications (author_id, message, created_date, expires_date, listing_id, agency_id)
         VALUES (1, 'both', 0, 0, 1, 1);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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
