//! Diagnostic helpers: logging what a live database contains and reading
//! whole tables.
//!
//! These are convenience calls, so failures are logged and replaced with
//! an empty result instead of being returned.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::catalog::{master_entries, table_columns};
use pseudo_schema_core::EntryKind;

const LOGGED_PRAGMAS: &[&str] = &[
    "user_version",
    "encoding",
    "auto_vacuum",
    "busy_timeout",
    "cache_size",
    "foreign_keys",
    "freelist_count",
    "journal_mode",
    "locking_mode",
    "page_count",
    "page_size",
    "synchronous",
    "temp_store",
];

/// Rows read from a table: column names plus one value per column per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column in each row.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Quotes an identifier for use in SQLite statements.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders a value for log output.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} byte blob>", b.len()),
    }
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    match master_entries(conn, Some(EntryKind::Table), Some(table)) {
        Ok(entries) => !entries.is_empty(),
        Err(err) => {
            warn!(table = %table, error = %err, "Could not check table existence");
            false
        }
    }
}

fn collect_rows(conn: &Connection, sql: &str) -> rusqlite::Result<RowSet> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(RowSet { columns, rows })
}

fn rows_or_empty(conn: &Connection, table: &str, sql: &str) -> RowSet {
    if !table_exists(conn, table) {
        debug!(table = %table, "Table not found in sqlite_master, returning no rows");
        return RowSet::default();
    }
    match collect_rows(conn, sql) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(table = %table, error = %err, "Row query failed, returning no rows");
            RowSet::default()
        }
    }
}

/// Reads every row of a table.
///
/// With `rowid_alias`, the rowid is prepended as a column of that name.
/// A missing table or a failed query yields an empty [`RowSet`].
pub fn all_rows(conn: &Connection, table: &str, rowid_alias: Option<&str>) -> RowSet {
    if table.is_empty() {
        debug!("Empty table name, returning no rows");
        return RowSet::default();
    }
    let projection = match rowid_alias.filter(|alias| !alias.is_empty()) {
        Some(alias) => format!("rowid AS {}, *", quote_identifier(alias)),
        None => "*".to_string(),
    };
    let sql = format!("SELECT {projection} FROM {}", quote_identifier(table));
    rows_or_empty(conn, table, &sql)
}

/// Reads the given columns of every row of a table.
///
/// Every column must exist in the live table. SQLite would otherwise read
/// an unknown double-quoted name as a string literal.
pub(crate) fn select_rows(conn: &Connection, table: &str, columns: &[&str]) -> RowSet {
    let live = match table_columns(conn, table) {
        Ok(live) => live,
        Err(err) => {
            warn!(table = %table, error = %err, "Could not read live columns, returning no rows");
            return RowSet::default();
        }
    };
    if let Some(missing) = columns
        .iter()
        .find(|c| !live.iter().any(|info| info.name.eq_ignore_ascii_case(c)))
    {
        warn!(table = %table, column = %missing, "Column not in table, returning no rows");
        return RowSet::default();
    }
    let projection = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {projection} FROM {}", quote_identifier(table));
    rows_or_empty(conn, table, &sql)
}

/// Logs the attached databases, engine version, common pragmas, and every
/// table with its columns, indexes and foreign keys, at `debug` level.
pub fn log_database_info(conn: &Connection) {
    if let Err(err) = log_database_list(conn) {
        warn!(error = %err, "Could not list attached databases");
    }

    match conn
        .query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0))
    {
        Ok(version) => debug!(version = %version, "sqlite_version()"),
        Err(err) => warn!(error = %err, "Could not read sqlite_version()"),
    }

    for pragma in LOGGED_PRAGMAS {
        match conn
            .query_row(&format!("PRAGMA {pragma}"), [], |row| row.get::<_, Value>(0))
            .optional()
        {
            Ok(Some(value)) => debug!(pragma, value = %display_value(&value), "Pragma"),
            Ok(None) => debug!(pragma, "Pragma returned no value"),
            Err(err) => warn!(pragma, error = %err, "Could not read pragma"),
        }
    }

    let tables = match master_entries(conn, Some(EntryKind::Table), None) {
        Ok(tables) => tables,
        Err(err) => {
            warn!(error = %err, "Could not list tables");
            return;
        }
    };
    for table in tables {
        debug!(
            table = %table.name,
            sql = table.sql.as_deref().unwrap_or(""),
            "Table"
        );
        match table_columns(conn, &table.name) {
            Ok(columns) => {
                for column in columns {
                    debug!(
                        table = %table.name,
                        column = %column.name,
                        declared_type = %column.declared_type,
                        default_value = column.default_value.as_deref().unwrap_or(""),
                        pk = column.pk,
                        "Column"
                    );
                }
            }
            Err(err) => warn!(table = %table.name, error = %err, "Could not read columns"),
        }
        if let Err(err) = log_table_indexes(conn, &table.name) {
            warn!(table = %table.name, error = %err, "Could not read indexes");
        }
        if let Err(err) = log_foreign_keys(conn, &table.name) {
            warn!(table = %table.name, error = %err, "Could not read foreign keys");
        }
    }
}

fn log_database_list(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("SELECT seq, name, file FROM pragma_database_list")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    for row in rows {
        let (seq, name, file) = row?;
        debug!(seq, name = %name, file = file.as_deref().unwrap_or(""), "Attached database");
    }
    Ok(())
}

fn log_table_indexes(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("SELECT name, \"unique\", origin FROM pragma_index_list(?1)")?;
    let rows = stmt.query_map(params![table], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)? != 0,
            row.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (name, unique, origin) = row?;
        debug!(table = %table, index = %name, unique, origin = %origin, "Index");
    }
    Ok(())
}

fn log_foreign_keys(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare("SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1)")?;
    let rows = stmt.query_map(params![table], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    for row in rows {
        let (parent, from, to) = row?;
        debug!(
            table = %table,
            from = %from,
            parent = %parent,
            to = to.as_deref().unwrap_or(""),
            "Foreign key"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (_id INTEGER PRIMARY KEY, name TEXT, info TEXT);
             INSERT INTO users (name, info) VALUES ('fred', NULL), ('mary', 'x');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_all_rows() {
        let conn = setup();
        let rows = all_rows(&conn, "users", None);
        assert_eq!(rows.columns, vec!["_id", "name", "info"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][1], Value::Text("fred".to_string()));
        assert_eq!(rows.rows[0][2], Value::Null);
    }

    #[test]
    fn test_all_rows_with_rowid_alias() {
        let conn = setup();
        let rows = all_rows(&conn, "users", Some("rid"));
        assert_eq!(rows.column_index("rid"), Some(0));
        assert_eq!(rows.rows[1][0], Value::Integer(2));
    }

    #[test]
    fn test_missing_table_gives_empty_rows() {
        let conn = setup();
        let rows = all_rows(&conn, "missing", None);
        assert!(rows.is_empty());
        assert!(rows.columns.is_empty());
        assert!(all_rows(&conn, "", None).is_empty());
    }

    #[test]
    fn test_select_rows_failure_gives_empty_rows() {
        let conn = setup();
        let rows = select_rows(&conn, "users", &["no_such_column"]);
        assert!(rows.is_empty());
        assert!(rows.columns.is_empty());
        assert!(select_rows(&conn, "users", &["name", "no_such_column"]).is_empty());
        assert!(select_rows(&conn, "missing", &["name"]).is_empty());
        assert_eq!(select_rows(&conn, "users", &["name"]).len(), 2);
    }

    #[test]
    fn test_select_rows_matches_columns_ignoring_case() {
        let conn = setup();
        let rows = select_rows(&conn, "users", &["NAME", "info"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[1][0], Value::Text("mary".to_string()));
    }

    #[test]
    fn test_log_database_info_does_not_panic() {
        let conn = setup();
        conn.execute_batch(
            "CREATE TABLE child (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(_id));
             CREATE INDEX ix ON users(name);",
        )
        .unwrap();
        log_database_info(&conn);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
