use staffbook_core::db::migrations::latest_version;
use staffbook_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "departments");
    assert_table_exists(&conn, "employees");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffbook.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "employees");
}

#[test]
fn newer_schema_is_rejected_without_touching_departments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE departments (id TEXT PRIMARY KEY, name TEXT NOT NULL);
         INSERT INTO departments (id, name) VALUES ('d1', 'Payroll');
         PRAGMA user_version = 999;",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version: 999, .. }
    ));
    assert_eq!(
        err.to_string(),
        format!(
            "database schema version 999 is newer than supported {}",
            latest_version()
        )
    );

    let conn = Connection::open(&path).unwrap();
    let name: String = conn
        .query_row("SELECT name FROM departments WHERE id = 'd1';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(name, "Payroll");
    assert_table_missing(&conn, "employees");
}

#[test]
fn departments_only_store_is_upgraded_with_rows_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_departments.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO departments (id, created_at, name)
         VALUES ('d1', '2024-01-01T00:00:00.000Z', 'Payroll');
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "employees");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn.execute(
        "INSERT INTO employees (id, created_at, first_name, last_name, hire_date, department_id)
         VALUES ('e1', '2024-01-01T00:00:00.000Z', 'Ada', 'Lovelace', '2024-01-01', 'missing');",
        [],
    );
    assert!(err.is_err());
}

#[test]
fn schema_rejects_overlong_names() {
    let conn = open_db_in_memory().unwrap();
    let err = conn.execute(
        "INSERT INTO departments (id, created_at, name) VALUES ('d1', '2024-01-01T00:00:00.000Z', ?1);",
        ["x".repeat(101)],
    );
    assert!(err.is_err());
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
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 0, "expected table `{table_name}` to be absent");
}
