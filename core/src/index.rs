//! Index definitions.
//!
//! An [`Index`] names one table and an ordered list of that table's
//! columns, each with a [`SortOrder`]. The index keeps the table by name;
//! validation is done against the table itself, which the owning
//! [`Database`](crate::Database) resolves.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::column::Column;
use crate::compare::IndexComparator;
use crate::table::Table;
use crate::validate::{Problem, Validation};

/// Sort direction of an index column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "ASC", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "DESC", alias = "descending")]
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// `true` maps to ascending, `false` to descending.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// A column reference held by an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Column name at the time the column was added to the index.
    pub name: String,
    /// Owning table of the referenced column, if it was attached.
    pub table: Option<String>,
}

impl From<&Column> for IndexColumn {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name().to_string(),
            table: column.table_name().map(str::to_string),
        }
    }
}

/// An index of a pseudo schema.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{Catalog, Column, Index, SortOrder, Table};
///
/// let users = Table::with_columns("users", vec![Column::standard_id(), Column::text("name")]);
/// let name = users.column("name").unwrap();
/// let index = Index::single("username_index", &users, name, SortOrder::Ascending, false);
///
/// assert!(index.validate(&users).is_valid());
/// assert_eq!(
///     index.render_create(),
///     "CREATE INDEX IF NOT EXISTS username_index ON users(name ASC)"
/// );
/// assert_eq!(index.qualified_name(), "users.username_index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    table: String,
    columns: Vec<IndexColumn>,
    orders: Vec<SortOrder>,
    unique: bool,
}

impl Index {
    /// Creates an index over several columns of `table`.
    ///
    /// `orders` must have one entry per column; a mismatch is reported by
    /// validation.
    pub fn new(
        name: impl Into<String>,
        table: &Table,
        columns: &[&Column],
        orders: Vec<SortOrder>,
        unique: bool,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.name().to_string(),
            columns: columns.iter().map(|c| IndexColumn::from(*c)).collect(),
            orders,
            unique,
        }
    }

    /// Creates an index over a single column of `table`.
    pub fn single(
        name: impl Into<String>,
        table: &Table,
        column: &Column,
        order: SortOrder,
        unique: bool,
    ) -> Self {
        Self::new(name, table, &[column], vec![order], unique)
    }

    /// Appends a column with its sort order.
    pub fn add_column(&mut self, column: &Column, order: SortOrder) {
        self.columns.push(IndexColumn::from(column));
        self.orders.push(order);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `table.index`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    /// Name of the table this index is built on.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[IndexColumn] {
        &self.columns
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Validates the index against its owning table.
    ///
    /// The table must be usable and named, every column must be named and
    /// belong to the table, the index must be named and there must be one
    /// sort order per column.
    pub fn validate(&self, table: &Table) -> Validation {
        let mut problems = Vec::new();

        if !table.is_usable() {
            problems.push(Problem::IndexTableUnusable {
                index: self.name.clone(),
                table: table.name().to_string(),
            });
        }
        if table.name().is_empty() {
            problems.push(Problem::IndexTableNameEmpty {
                index: self.name.clone(),
            });
        }
        let count = self.columns.len();
        for (position, column) in self.columns.iter().enumerate() {
            if column.name.is_empty() {
                problems.push(Problem::IndexColumnNameEmpty {
                    index: self.name.clone(),
                    position,
                    count,
                });
            }
            if !table.contains(&column.name, column.table.as_deref()) {
                problems.push(Problem::IndexColumnNotInTable {
                    index: self.name.clone(),
                    column: column.name.clone(),
                    table: table.name().to_string(),
                });
            }
        }
        if self.name.is_empty() {
            problems.push(Problem::InvalidIndexName {
                table: table.name().to_string(),
            });
        }
        if self.columns.len() != self.orders.len() {
            problems.push(Problem::SortOrderMismatch {
                index: self.name.clone(),
                columns: self.columns.len(),
                orders: self.orders.len(),
            });
        }

        Validation::from_problems(problems)
    }

    /// Renders `CREATE [UNIQUE] INDEX IF NOT EXISTS name ON table(col ASC, ...)`.
    pub fn render_create(&self) -> String {
        let columns = self
            .columns
            .iter()
            .zip(&self.orders)
            .map(|(column, order)| format!("{} {}", column.name, order.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {unique}INDEX IF NOT EXISTS {} ON {}({columns})",
            self.name, self.table
        )
    }

    /// Renders `DROP INDEX IF EXISTS name`.
    pub fn render_drop(&self) -> String {
        format!("DROP INDEX IF EXISTS {}", self.name)
    }

    /// Returns the statement creating this index, unless the index is
    /// unusable on `table` or already exists.
    pub fn build_sql(&self, table: &Table, catalog: &Catalog) -> Option<String> {
        if !self.validate(table).is_valid() {
            debug!(index = %self.name, "Skipping create for unusable index");
            return None;
        }
        if catalog.has_index(&self.name) {
            return None;
        }
        Some(self.render_create())
    }

    /// Returns the statements aligning the live index with this one.
    ///
    /// Nothing when the live index is equivalent, the `CREATE` alone when
    /// it is missing, otherwise a `DROP` followed by the `CREATE`.
    pub fn alter_sql(
        &self,
        table: &Table,
        catalog: &Catalog,
        comparator: &dyn IndexComparator,
    ) -> Vec<String> {
        if !self.validate(table).is_valid() {
            return Vec::new();
        }
        let desired = self.render_create();
        match catalog.index_sql(&self.name) {
            None => vec![desired],
            Some(Some(live)) if comparator.is_equivalent(&desired, live) => Vec::new(),
            Some(live) => {
                debug!(
                    index = %self.name,
                    live = live.unwrap_or("<automatic>"),
                    desired = %desired,
                    "Index differs from live definition, rebuilding"
                );
                vec![self.render_drop(), desired]
            }
        }
    }

    /// Renders an approximate MySQL `CREATE INDEX` for export.
    pub fn export_create(&self) -> String {
        let columns = self
            .columns
            .iter()
            .zip(&self.orders)
            .map(|(column, order)| format!("`{}` {}", column.name, order.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {unique}INDEX `{}` ON `{}` ({columns});",
            self.name, self.table
        )
    }
}
