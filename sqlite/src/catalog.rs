//! Reading the live schema from `sqlite_master` and `PRAGMA table_info`.

use pseudo_schema_core::{
    Catalog, CatalogEntry, CatalogSource, ColumnInfo, EntryKind, RESERVED_METADATA_TABLE,
};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::{Result, SqliteError};

/// Lists `sqlite_master` rows, optionally filtered by kind and name.
///
/// The reserved metadata table is never returned. Rows of an unknown kind
/// are skipped.
pub fn master_entries(
    conn: &Connection,
    kind: Option<EntryKind>,
    name: Option<&str>,
) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT type, name, tbl_name, sql FROM sqlite_master \
         WHERE (?1 IS NULL OR type = ?1) \
           AND (?2 IS NULL OR name = ?2) \
           AND NOT (type = 'table' AND name = ?3)",
    )?;
    let rows = stmt
        .query_map(
            params![kind.map(EntryKind::as_str), name, RESERVED_METADATA_TABLE],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(rows.len());
    for (kind, name, table_name, sql) in rows {
        let Some(kind) = EntryKind::parse(&kind) else {
            debug!(kind = %kind, name = %name, "Skipping catalog entry of unknown kind");
            continue;
        };
        entries.push(CatalogEntry {
            kind,
            name,
            table_name,
            sql,
        });
    }
    Ok(entries)
}

/// Returns the column descriptors of a table, empty when it does not exist.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map(params![table], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                declared_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                pk: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Reads a full catalog snapshot: every entry plus the columns of every table.
pub fn read_catalog(conn: &Connection) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    let mut tables = Vec::new();
    for entry in master_entries(conn, None, None)? {
        if entry.kind == EntryKind::Table {
            tables.push(entry.name.clone());
        }
        catalog.push_entry(entry);
    }
    for table in tables {
        let columns = table_columns(conn, &table)?;
        catalog.set_table_columns(table, columns);
    }
    debug!(
        tables = catalog.table_names().len(),
        indexes = catalog.entries_of(EntryKind::Index).count(),
        "Read live catalog"
    );
    Ok(catalog)
}

/// [`CatalogSource`] over a borrowed connection.
pub struct SqliteCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CatalogSource for SqliteCatalog<'_> {
    type Error = SqliteError;

    fn read_catalog(&self) -> Result<Catalog> {
        read_catalog(self.conn)
    }
}
