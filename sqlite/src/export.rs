//! Best-effort export of live row data as portable `INSERT` statements.
//!
//! The output is meant for loading into a MySQL-like database alongside
//! [`Database::export_schema_sql`]. String escaping is rudimentary: single
//! and double quotes inside text values are replaced with the placeholder
//! tokens [`APOSTROPHE_TOKEN`] and [`QUOTE_TOKEN`], which the importing side
//! must translate back.

use pseudo_schema_core::Database;
use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::catalog::table_columns;
use crate::inspect::{RowSet, select_rows};

/// Replaces `'` in exported text values.
pub const APOSTROPHE_TOKEN: &str = "#@APOST@#";
/// Replaces `"` in exported text values.
pub const QUOTE_TOKEN: &str = "#@QUOTE@#";

/// Renders every row of every schema table as an `INSERT` statement.
///
/// Only the schema's columns that exist in the live table are exported.
/// Missing or empty tables produce a `-- table <name> is empty, skipped`
/// comment. An unusable schema exports nothing.
pub fn export_data_sql(conn: &Connection, database: &Database) -> String {
    if !database.is_usable() {
        debug!(database = %database.name(), "Skipping data export for unusable database");
        return String::new();
    }

    let mut sql = String::new();
    for table in database.tables() {
        let live = match table_columns(conn, table.name()) {
            Ok(live) => live,
            Err(err) => {
                warn!(table = %table.name(), error = %err, "Could not read live columns");
                Vec::new()
            }
        };
        let columns: Vec<&str> = table
            .columns()
            .iter()
            .map(|c| c.name())
            .filter(|name| live.iter().any(|info| info.name == *name))
            .collect();

        let rows = if columns.is_empty() {
            RowSet::default()
        } else {
            select_rows(conn, table.name(), &columns)
        };
        if rows.is_empty() {
            sql.push_str(&format!("-- table {} is empty, skipped\n", table.name()));
            continue;
        }

        let column_list = columns
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ");
        for row in &rows.rows {
            let values = row.iter().map(render_value).collect::<Vec<_>>().join(", ");
            sql.push_str(&format!(
                "INSERT INTO `{}` ({column_list}) VALUES ({values});\n",
                table.name()
            ));
        }
        debug!(table = %table.name(), rows = rows.len(), "Exported table data");
    }
    sql
}

/// Renders one value as a SQL literal.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => format!("'{}'", escape_text(s)),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}

/// Replaces quote characters with placeholder tokens.
pub fn escape_text(text: &str) -> String {
    text.replace('\'', APOSTROPHE_TOKEN).replace('"', QUOTE_TOKEN)
}
