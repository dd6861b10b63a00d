//! Table definitions and their `CREATE`/`ALTER` rendering.
//!
//! A [`Table`] owns an ordered list of [`Column`]s. Insertion order is the
//! column order of every generated statement. Tables evolve additively:
//! a table that already exists is never re-created, only extended with
//! `ALTER TABLE ... ADD COLUMN` for the columns it lacks.

use tracing::debug;

use crate::affinity::Affinity;
use crate::catalog::Catalog;
use crate::column::Column;
use crate::validate::{Problem, Validation, join_messages};

/// A table of a pseudo schema.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{Catalog, Column, Table};
///
/// let users = Table::with_columns(
///     "users",
///     vec![Column::standard_id(), Column::text("name"), Column::text("info")],
/// );
/// assert!(users.is_usable());
/// assert_eq!(
///     users.create_sql(&Catalog::new()).unwrap(),
///     "CREATE TABLE IF NOT EXISTS users (_id INTEGER PRIMARY KEY, name TEXT, info TEXT)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table with no columns yet (unusable until one is added).
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            columns: Vec::new(),
        }
    }

    /// Creates a table with the given columns, in order.
    pub fn with_columns(name: impl AsRef<str>, columns: impl IntoIterator<Item = Column>) -> Self {
        let mut table = Self::new(name);
        table.add_columns(columns);
        table
    }

    /// Appends a column, attaching it to this table.
    pub fn add_column(&mut self, mut column: Column) {
        column.attach(&self.name);
        self.columns.push(column);
    }

    /// Appends several columns, in order.
    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = Column>) {
        for column in columns {
            self.add_column(column);
        }
    }

    /// Renames the table and re-attaches every column under the new name.
    pub fn rename(&mut self, name: impl AsRef<str>) {
        self.name = name.as_ref().to_lowercase();
        let name = self.name.clone();
        for column in &mut self.columns {
            column.attach(&name);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Finds a column by (lower-cased) name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        let name = name.to_lowercase();
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Finds a column by name for modification.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let name = name.to_lowercase();
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    /// Returns `true` when the column is a member of this table: same name
    /// and attached to this table.
    pub fn contains(&self, name: &str, owner: Option<&str>) -> bool {
        owner == Some(self.name.as_str()) && self.columns.iter().any(|c| c.name() == name)
    }

    /// Validates the table.
    ///
    /// Reports a missing name, an empty column list, every unusable column
    /// and every pair of columns sharing a name.
    pub fn validate(&self) -> Validation {
        let mut problems = Vec::new();

        if self.columns.is_empty() {
            problems.push(Problem::NoColumns {
                table: self.name.clone(),
            });
        }
        if self.name.is_empty() {
            problems.push(Problem::InvalidTableName);
        }
        for column in &self.columns {
            if !column.is_usable() {
                problems.push(Problem::UnusableColumn {
                    table: self.name.clone(),
                    column: column.name().to_string(),
                });
            }
        }
        for (i, first) in self.columns.iter().enumerate() {
            for (j, second) in self.columns.iter().enumerate().skip(i + 1) {
                if first.name() == second.name() {
                    problems.push(Problem::DuplicateColumn {
                        table: self.name.clone(),
                        column: first.name().to_string(),
                        first: i,
                        second: j,
                    });
                }
            }
        }

        Validation::from_problems(problems)
    }

    pub fn is_usable(&self) -> bool {
        self.validate().is_valid()
    }

    /// Returns this table's own problem messages.
    pub fn problem_message(&self) -> String {
        self.validate().message()
    }

    /// Returns this table's problems followed by those of its columns.
    pub fn all_problems(&self) -> Vec<Problem> {
        let mut problems = self.validate().into_problems();
        for column in &self.columns {
            problems.extend(column.validate().into_problems());
        }
        problems
    }

    /// Returns this table's problem messages followed by its columns'.
    pub fn all_problem_messages(&self) -> String {
        join_messages(&self.all_problems())
    }

    fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(Column::name)
            .collect()
    }

    /// Renders the `CREATE TABLE IF NOT EXISTS` statement.
    ///
    /// A single key column carries an inline `PRIMARY KEY`; two or more key
    /// columns are listed in one trailing `PRIMARY KEY (...)` clause.
    pub fn render_create(&self) -> String {
        let keys = self.primary_key_columns();
        let inline_key = keys.len() == 1;
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.render_definition(inline_key))
            .collect();
        if keys.len() > 1 {
            parts.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            parts.join(", ")
        )
    }

    /// Returns the statement creating this table, unless the table is
    /// unusable or already present in the catalog.
    pub fn create_sql(&self, catalog: &Catalog) -> Option<String> {
        if !self.is_usable() {
            debug!(table = %self.name, "Skipping create for unusable table");
            return None;
        }
        if catalog.has_table(&self.name) {
            return None;
        }
        Some(self.render_create())
    }

    /// Renders one `ALTER TABLE ... ADD COLUMN` statement.
    pub fn render_add_column(&self, column: &Column) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.name,
            column.name(),
            column.affinity()
        );
        if column.is_primary_key() {
            sql.push_str(" PRIMARY KEY");
        }
        if column.has_default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(column.default_value());
        }
        sql
    }

    /// Returns one `ADD COLUMN` statement per column missing from the live
    /// table.
    ///
    /// Matching is by name only; existing columns are never changed. A
    /// table absent from the catalog yields nothing, since creating it is
    /// the job of the build step.
    pub fn alter_sql(&self, catalog: &Catalog) -> Vec<String> {
        if !self.is_usable() {
            return Vec::new();
        }
        let Some(live) = catalog.table_columns(&self.name) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter(|c| !live.iter().any(|info| info.name == c.name()))
            .map(|c| self.render_add_column(c))
            .collect()
    }

    /// Renders an approximate MySQL `CREATE TABLE` for export.
    ///
    /// Identifiers are back-quoted and `INTEGER` columns become
    /// `BIGINT(20) NOT NULL`. No usability check is made.
    pub fn export_create(&self) -> String {
        let keys = self.primary_key_columns();
        let inline_key = keys.len() == 1;
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut part = if c.affinity() == Affinity::Integer {
                    format!("`{}` BIGINT(20) NOT NULL", c.name())
                } else {
                    format!("`{}` {}", c.name(), c.affinity())
                };
                if c.has_default() {
                    part.push_str(" DEFAULT ");
                    part.push_str(c.default_value());
                }
                if inline_key && c.is_primary_key() {
                    part.push_str(" PRIMARY KEY");
                }
                part
            })
            .collect();
        if keys.len() > 1 {
            let quoted: Vec<String> = keys.iter().map(|k| format!("`{k}`")).collect();
            parts.push(format!("PRIMARY KEY ({})", quoted.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS `{}` ({});",
            self.name,
            parts.join(", ")
        )
    }
}
