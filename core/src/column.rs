//! Column definitions.
//!
//! A [`Column`] is the leaf of a pseudo schema: a name, a storage
//! [`Affinity`], primary-key membership, an optional default and an
//! advisory sort order. Names are lower-cased as they are set.
//!
//! A column belongs to at most one [`Table`](crate::Table). The table sets
//! the owning-table name when the column is attached, which is what
//! [`qualified_name`](Column::qualified_name) reports. To reuse the same
//! column shape in another table, take a [`detached`](Column::detached)
//! copy.

use crate::affinity::Affinity;
use crate::validate::{Problem, Validation};

/// Conventional name of the standard row identifier column.
pub const STANDARD_ID_COLUMN: &str = "_id";

/// A column of a pseudo schema table.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{Affinity, Column};
///
/// let column = Column::new("Price", "decimal(10,2)", false, "0");
/// assert_eq!(column.name(), "price");
/// assert_eq!(column.affinity(), Affinity::Numeric);
/// assert_eq!(column.default_value(), "0");
/// assert!(column.is_usable());
/// assert!(column.qualified_name().is_none());
///
/// let id = Column::standard_id();
/// assert_eq!(id.name(), "_id");
/// assert!(id.is_primary_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    affinity: Affinity,
    primary_key: bool,
    default_value: String,
    sort_order: i32,
    table: Option<String>,
}

impl Column {
    /// Creates a fully specified column.
    ///
    /// `declared_type` is normalized with [`Affinity::from_declared`]; an
    /// empty `default_value` means the column has no default.
    pub fn new(
        name: impl AsRef<str>,
        declared_type: impl AsRef<str>,
        primary_key: bool,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            affinity: Affinity::from_declared(declared_type.as_ref()),
            primary_key,
            default_value: default_value.into(),
            sort_order: 0,
            table: None,
        }
    }

    /// Creates a `TEXT` column with no key and no default.
    pub fn text(name: impl AsRef<str>) -> Self {
        Self::new(name, Affinity::Text.as_str(), false, "")
    }

    /// Creates the standard identifier column, `_id INTEGER PRIMARY KEY`.
    ///
    /// SQLite treats a lone `INTEGER PRIMARY KEY` as an alias of the rowid,
    /// so the column auto-increments.
    pub fn standard_id() -> Self {
        Self::new(STANDARD_ID_COLUMN, Affinity::Integer.as_str(), true, "")
    }

    /// Sets the advisory sort order.
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Returns an unattached copy of this column.
    pub fn detached(&self) -> Self {
        Self {
            table: None,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Returns the default value; empty means none.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn has_default(&self) -> bool {
        !self.default_value.is_empty()
    }

    /// Returns the advisory sort order. It has no effect on generated SQL.
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns the name of the owning table, if attached.
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns `table.column` once the column is attached to a table.
    pub fn qualified_name(&self) -> Option<String> {
        self.table
            .as_ref()
            .map(|table| format!("{table}.{}", self.name))
    }

    pub fn set_name(&mut self, name: impl AsRef<str>) {
        self.name = name.as_ref().to_lowercase();
    }

    pub fn set_type(&mut self, declared_type: impl AsRef<str>) {
        self.affinity = Affinity::from_declared(declared_type.as_ref());
    }

    pub fn set_default(&mut self, default_value: impl Into<String>) {
        self.default_value = default_value.into();
    }

    pub fn set_primary_key(&mut self, primary_key: bool) {
        self.primary_key = primary_key;
    }

    pub fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }

    /// Records the owning table. Only tables attach columns.
    pub(crate) fn attach(&mut self, table: &str) {
        self.table = Some(table.to_string());
    }

    /// Validates the column.
    ///
    /// The type can never be empty once normalized, so the only rule that
    /// can fail is the name length.
    pub fn validate(&self) -> Validation {
        let mut problems = Vec::new();
        if self.name.is_empty() {
            problems.push(Problem::InvalidColumnName);
        }
        Validation::from_problems(problems)
    }

    pub fn is_usable(&self) -> bool {
        self.validate().is_valid()
    }

    /// Returns the newline separated problem messages (empty when usable).
    pub fn problem_message(&self) -> String {
        self.validate().message()
    }

    /// Renders the column for a `CREATE TABLE` column list.
    ///
    /// The inline `PRIMARY KEY` suffix is only added when `inline_key` is
    /// set, i.e. when this is the table's single key column.
    pub(crate) fn render_definition(&self, inline_key: bool) -> String {
        let mut sql = format!("{} {}", self.name, self.affinity);
        if self.has_default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_value);
        }
        if inline_key && self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        sql
    }
}
