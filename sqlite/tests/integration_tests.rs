//! Integration tests for the pseudo-schema-sqlite crate.

use std::time::Duration;

use pseudo_schema_core::{Column, Database, Index, SortOrder, Table};
use pseudo_schema_sqlite::catalog::table_columns;
use pseudo_schema_sqlite::{Migrator, SqliteError, export_data_sql};
use rusqlite::{Connection, ErrorCode, TransactionBehavior};

fn users() -> Table {
    Table::with_columns(
        "users",
        vec![Column::standard_id(), Column::text("name"), Column::text("info")],
    )
}

fn property() -> Table {
    Table::with_columns("property", vec![Column::standard_id(), Column::text("descr")])
}

/// The users/property/link schema with one index per entity table.
fn showcase(user_name_order: SortOrder) -> Database {
    let users = users();
    let property = property();
    let link = Table::with_columns(
        "userpropertylink",
        vec![
            Column::new("userref", "INTEGER", true, ""),
            Column::new("propertyref", "INTEGER", true, ""),
        ],
    );
    let username_index = Index::single(
        "username_index",
        &users,
        users.column("name").unwrap(),
        user_name_order,
        false,
    );
    let descr_index = Index::single(
        "propertydescr_index",
        &property,
        property.column("descr").unwrap(),
        SortOrder::Ascending,
        true,
    );
    Database::with_tables_and_indexes(
        "mydatabase",
        vec![users, property, link],
        vec![username_index, descr_index],
    )
}

fn migrator() -> Migrator {
    Migrator::new(Connection::open_in_memory().unwrap())
}

#[test]
fn test_build_then_build_again_is_empty() {
    let database = showcase(SortOrder::Ascending);
    let mut migrator = migrator();

    let report = migrator.build(&database).unwrap();
    assert_eq!(report.len(), 5);
    assert!(report.statements[..3].iter().all(|s| s.starts_with("CREATE TABLE")));
    assert!(report.statements[3..].iter().all(|s| s.contains("INDEX")));

    assert!(migrator.plan_build(&database).unwrap().is_empty());
    assert!(migrator.plan_alter(&database).unwrap().is_empty());
}

#[test]
fn test_composite_key_is_accepted_by_sqlite() {
    let database = showcase(SortOrder::Ascending);
    let mut migrator = migrator();
    migrator.build(&database).unwrap();

    let columns = table_columns(migrator.connection(), "userpropertylink").unwrap();
    let keys: Vec<_> = columns.iter().map(|c| (c.name.as_str(), c.pk)).collect();
    assert_eq!(keys, vec![("userref", 1), ("propertyref", 2)]);
}

#[test]
fn test_additive_alter_runs_once() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (a TEXT, b TEXT); INSERT INTO t VALUES ('x', 'y');")
        .unwrap();
    let database = Database::with_tables(
        "mydatabase",
        vec![Table::with_columns(
            "t",
            vec![Column::text("a"), Column::text("b"), Column::text("c")],
        )],
    );
    let mut migrator = Migrator::new(conn);

    assert!(migrator.plan_build(&database).unwrap().is_empty());
    let first = migrator.alter(&database).unwrap();
    assert_eq!(first.statements, vec!["ALTER TABLE t ADD COLUMN c TEXT"]);
    assert!(migrator.alter(&database).unwrap().is_empty());

    let count: i64 = migrator
        .connection()
        .query_row("SELECT COUNT(*) FROM t WHERE c IS NULL", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_changed_index_is_rebuilt_once() {
    let mut migrator = migrator();
    migrator.sync(&showcase(SortOrder::Ascending)).unwrap();

    let desired = showcase(SortOrder::Descending);
    assert_eq!(
        migrator.plan_alter(&desired).unwrap(),
        vec![
            "DROP INDEX IF EXISTS username_index",
            "CREATE INDEX IF NOT EXISTS username_index ON users(name DESC)",
        ]
    );
    assert_eq!(migrator.alter(&desired).unwrap().len(), 2);
    assert!(migrator.plan_alter(&desired).unwrap().is_empty());

    let sql: String = migrator
        .connection()
        .query_row(
            "SELECT sql FROM sqlite_master WHERE name = 'username_index'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(sql.contains("DESC"));
}

#[test]
fn test_failed_statement_rolls_back_whole_phase() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (a TEXT)").unwrap();
    // SQLite cannot add a PRIMARY KEY column, so the second statement fails.
    let database = Database::with_tables(
        "mydatabase",
        vec![Table::with_columns(
            "t",
            vec![
                Column::text("a"),
                Column::text("b"),
                Column::new("c", "INTEGER", true, ""),
            ],
        )],
    );
    let mut migrator = Migrator::new(conn);

    let err = migrator.alter(&database).unwrap_err();
    match &err {
        SqliteError::StatementFailed { statement, .. } => {
            assert_eq!(statement, "ALTER TABLE t ADD COLUMN c INTEGER PRIMARY KEY");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        err.engine_error(),
        rusqlite::Error::SqliteFailure(..)
    ));

    let columns = table_columns(migrator.connection(), "t").unwrap();
    assert_eq!(columns.len(), 1, "column b must have been rolled back");
}

#[test]
fn test_phase_plans_inside_its_write_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let database = showcase(SortOrder::Ascending);

    let conn = Connection::open(&path).unwrap();
    conn.busy_timeout(Duration::ZERO).unwrap();
    let mut migrator = Migrator::new(conn);

    // Another writer holds the database while it creates `users` itself.
    let mut other = Connection::open(&path).unwrap();
    let tx = other
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .unwrap();
    tx.execute_batch("CREATE TABLE users (_id INTEGER PRIMARY KEY, name TEXT, info TEXT)")
        .unwrap();

    let err = migrator.build(&database).unwrap_err();
    match err.engine_error() {
        rusqlite::Error::SqliteFailure(failure, _) => {
            assert_eq!(failure.code, ErrorCode::DatabaseBusy);
        }
        other => panic!("unexpected error: {other}"),
    }
    tx.commit().unwrap();

    // Planned after the other writer committed: `users` is not created again.
    let report = migrator.build(&database).unwrap();
    assert_eq!(report.len(), 4);
    assert!(report.statements.iter().all(|s| !s.starts_with("CREATE TABLE IF NOT EXISTS users")));
}

#[test]
fn test_plan_sync_matches_sync() {
    let database = showcase(SortOrder::Ascending);
    let mut migrator = migrator();

    let plan = migrator.plan_sync(&database).unwrap();
    assert_eq!(plan.build.len(), 5);
    assert!(plan.alter.is_empty(), "indexes must not be planned twice");
    assert!(migrator.catalog().unwrap().table_names().is_empty());

    assert_eq!(migrator.sync(&database).unwrap(), plan);
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let database = showcase(SortOrder::Ascending);

    let mut migrator = Migrator::open(&path).unwrap();
    assert_eq!(migrator.sync(&database).unwrap().len(), 5);
    drop(migrator.into_connection());

    let mut migrator = Migrator::open(&path).unwrap();
    assert!(migrator.sync(&database).unwrap().is_empty());
}

#[test]
fn test_export_data() {
    let database = showcase(SortOrder::Ascending);
    let mut migrator = migrator();
    migrator.build(&database).unwrap();
    migrator
        .connection()
        .execute_batch(
            "INSERT INTO users (name, info) VALUES ('o''brien', 'say \"hi\"'), ('fred', NULL);",
        )
        .unwrap();

    let sql = export_data_sql(migrator.connection(), &database);
    let lines: Vec<&str> = sql.lines().collect();
    assert_eq!(
        lines,
        vec![
            "INSERT INTO `users` (`_id`, `name`, `info`) VALUES (1, 'o#@APOST@#brien', 'say #@QUOTE@#hi#@QUOTE@#');",
            "INSERT INTO `users` (`_id`, `name`, `info`) VALUES (2, 'fred', NULL);",
            "-- table property is empty, skipped",
            "-- table userpropertylink is empty, skipped",
        ]
    );
}

#[test]
fn test_export_data_only_uses_live_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE users (_id INTEGER PRIMARY KEY, name TEXT); INSERT INTO users (name) VALUES ('fred');")
        .unwrap();
    let database = Database::with_tables("mydatabase", vec![users(), property()]);

    let sql = export_data_sql(&conn, &database);
    assert!(sql.contains("INSERT INTO `users` (`_id`, `name`) VALUES (1, 'fred');"));
    assert!(sql.contains("-- table property is empty, skipped"));
}
