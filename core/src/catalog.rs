//! Snapshots of what a live database currently contains.
//!
//! SQL generation never talks to a database directly. Instead a driver
//! reads the system catalog into a [`Catalog`] value and the pseudo schema
//! diffs itself against that value. Drivers implement [`CatalogSource`];
//! tests build snapshots by hand with [`Catalog::with_table`] and
//! [`Catalog::with_index`].

use std::collections::BTreeMap;

/// Table that the Android SQLite wrapper creates for locale metadata.
/// It is never reported as a table of the catalog.
pub const RESERVED_METADATA_TABLE: &str = "android_metadata";

/// Kind of a system catalog entry (the `type` column of `sqlite_master`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Table,
    Index,
    View,
    Trigger,
}

impl EntryKind {
    /// Returns the catalog spelling of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::View => "view",
            Self::Trigger => "trigger",
        }
    }

    /// Parses the catalog spelling of a kind.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "table" => Some(Self::Table),
            "index" => Some(Self::Index),
            "view" => Some(Self::View),
            "trigger" => Some(Self::Trigger),
            _ => None,
        }
    }
}

/// One row of the system catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: EntryKind,
    pub name: String,
    /// Table the entry belongs to (the entry's own name for tables).
    pub table_name: String,
    /// Creating SQL as recorded by the engine; `None` for automatic indexes.
    pub sql: Option<String>,
}

/// One column descriptor of a live table, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it.
    pub pk: i64,
}

impl ColumnInfo {
    /// Creates a descriptor with only a name and declared type.
    pub fn new(cid: i64, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            cid,
            name: name.into(),
            declared_type: declared_type.into(),
            not_null: false,
            default_value: None,
            pk: 0,
        }
    }
}

/// A snapshot of the live schema.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{Catalog, ColumnInfo};
///
/// let catalog = Catalog::new()
///     .with_table("users", vec![ColumnInfo::new(0, "_id", "INTEGER")])
///     .with_index("username_index", "users", "CREATE INDEX username_index ON users(name ASC)");
///
/// assert!(catalog.has_table("users"));
/// assert!(catalog.has_index("username_index"));
/// assert!(catalog.table_columns("users").unwrap().iter().any(|c| c.name == "_id"));
/// assert!(!catalog.has_table("android_metadata"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    columns: BTreeMap<String, Vec<ColumnInfo>>,
}

impl Catalog {
    /// Creates an empty snapshot, i.e. a brand new database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog entry. Entries for the reserved metadata table are ignored.
    pub fn push_entry(&mut self, entry: CatalogEntry) {
        if entry.kind == EntryKind::Table && entry.name == RESERVED_METADATA_TABLE {
            return;
        }
        self.entries.push(entry);
    }

    /// Records the column descriptors of a table.
    pub fn set_table_columns(&mut self, table: impl Into<String>, columns: Vec<ColumnInfo>) {
        self.columns.insert(table.into(), columns);
    }

    /// Adds a table together with its columns.
    pub fn with_table(mut self, name: &str, columns: Vec<ColumnInfo>) -> Self {
        let definitions = columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.declared_type))
            .collect::<Vec<_>>()
            .join(", ");
        self.push_entry(CatalogEntry {
            kind: EntryKind::Table,
            name: name.to_string(),
            table_name: name.to_string(),
            sql: Some(format!("CREATE TABLE {name} ({definitions})")),
        });
        if name != RESERVED_METADATA_TABLE {
            self.set_table_columns(name, columns);
        }
        self
    }

    /// Adds an index with its recorded creating SQL.
    pub fn with_index(mut self, name: &str, table: &str, sql: &str) -> Self {
        self.push_entry(CatalogEntry {
            kind: EntryKind::Index,
            name: name.to_string(),
            table_name: table.to_string(),
            sql: Some(sql.to_string()),
        });
        self
    }

    /// Returns every entry, in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Returns the entries of one kind.
    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    fn find(&self, kind: EntryKind, name: &str) -> Option<&CatalogEntry> {
        self.entries_of(kind).find(|e| e.name == name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.find(EntryKind::Table, name).is_some()
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.find(EntryKind::Index, name).is_some()
    }

    /// Returns the recorded creating SQL of an index.
    ///
    /// The outer `Option` tells whether the index exists; automatic indexes
    /// exist without SQL.
    pub fn index_sql(&self, name: &str) -> Option<Option<&str>> {
        self.find(EntryKind::Index, name).map(|e| e.sql.as_deref())
    }

    /// Returns the live column descriptors of a table, if it exists.
    pub fn table_columns(&self, table: &str) -> Option<&[ColumnInfo]> {
        if !self.has_table(table) {
            return None;
        }
        Some(self.columns.get(table).map_or(&[][..], Vec::as_slice))
    }

    /// Returns the names of all tables, in catalog order.
    pub fn table_names(&self) -> Vec<&str> {
        self.entries_of(EntryKind::Table)
            .map(|e| e.name.as_str())
            .collect()
    }
}

/// A source of catalog snapshots, implemented by database drivers.
pub trait CatalogSource {
    /// Error type for introspection failures.
    type Error: std::error::Error;

    /// Reads the current catalog.
    fn read_catalog(&self) -> Result<Catalog, Self::Error>;
}
