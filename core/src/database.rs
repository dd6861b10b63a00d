//! The pseudo schema root: tables and indexes under one database name.
//!
//! [`Database`] aggregates validation and SQL generation across its
//! children. Generation is a pure function of the schema and a
//! [`Catalog`] snapshot; executing the statements is left to a driver.

use tracing::debug;

use crate::catalog::Catalog;
use crate::compare::{IndexComparator, TextualComparator};
use crate::index::Index;
use crate::table::Table;
use crate::validate::{Problem, Validation, join_messages};

/// A complete pseudo schema.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{Catalog, Column, Database, Table};
///
/// let database = Database::with_tables(
///     "mydatabase",
///     vec![
///         Table::with_columns("users", vec![Column::standard_id(), Column::text("name")]),
///         Table::with_columns("property", vec![Column::standard_id(), Column::text("descr")]),
///     ],
/// );
/// assert!(database.is_usable());
/// assert_eq!(database.table_names(), vec!["users", "property"]);
///
/// let sql = database.build_sql(&Catalog::new());
/// assert_eq!(sql.len(), 2);
/// assert!(sql[0].starts_with("CREATE TABLE IF NOT EXISTS users "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    name: String,
    tables: Vec<Table>,
    indexes: Vec<Index>,
}

impl Database {
    /// Creates a database with no tables yet (unusable until one is added).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_tables(name: impl Into<String>, tables: impl IntoIterator<Item = Table>) -> Self {
        let mut database = Self::new(name);
        database.add_tables(tables);
        database
    }

    pub fn with_tables_and_indexes(
        name: impl Into<String>,
        tables: impl IntoIterator<Item = Table>,
        indexes: impl IntoIterator<Item = Index>,
    ) -> Self {
        let mut database = Self::with_tables(name, tables);
        database.add_indexes(indexes);
        database
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn add_tables(&mut self, tables: impl IntoIterator<Item = Table>) {
        self.tables.extend(tables);
    }

    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    pub fn add_indexes(&mut self, indexes: impl IntoIterator<Item = Index>) {
        self.indexes.extend(indexes);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Finds a table by (lower-cased) name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        let name = name.to_lowercase();
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        let name = name.to_lowercase();
        self.tables.iter_mut().find(|t| t.name() == name)
    }

    /// Returns the table names in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    /// Validates the database.
    ///
    /// Needs at least one table and a name; every table and every index
    /// must be usable, and every index must name a table of this database.
    pub fn validate(&self) -> Validation {
        let mut problems = Vec::new();

        if self.tables.is_empty() {
            problems.push(Problem::NoTables);
        }
        if self.name.is_empty() {
            problems.push(Problem::InvalidDatabaseName);
        }
        for table in &self.tables {
            if !table.is_usable() {
                problems.push(Problem::UnusableTable {
                    table: table.name().to_string(),
                });
            }
        }
        for index in &self.indexes {
            match self.table(index.table_name()) {
                None => problems.push(Problem::UnknownIndexTable {
                    index: index.name().to_string(),
                    table: index.table_name().to_string(),
                }),
                Some(table) => {
                    if let Validation::Invalid(reasons) = index.validate(table) {
                        problems.push(Problem::UnusableIndex {
                            index: index.name().to_string(),
                            reasons: join_reasons(&reasons),
                        });
                    }
                }
            }
        }

        Validation::from_problems(problems)
    }

    pub fn is_usable(&self) -> bool {
        self.validate().is_valid()
    }

    /// Returns the database's own problem messages.
    pub fn problem_message(&self) -> String {
        self.validate().message()
    }

    /// Returns the database's problems followed by every table's (and their
    /// columns') problems.
    pub fn all_problems(&self) -> Vec<Problem> {
        let mut problems = self.validate().into_problems();
        for table in &self.tables {
            problems.extend(table.all_problems());
        }
        problems
    }

    pub fn all_problem_messages(&self) -> String {
        join_messages(&self.all_problems())
    }

    /// Pairs each index with its table, skipping indexes whose table is
    /// not part of this database.
    fn indexes_with_tables(&self) -> impl Iterator<Item = (&Index, &Table)> {
        self.indexes.iter().filter_map(|index| {
            let table = self.table(index.table_name());
            if table.is_none() {
                debug!(index = %index.name(), table = %index.table_name(), "Index table not in database");
            }
            table.map(|table| (index, table))
        })
    }

    /// Returns the statements creating every missing table, in table
    /// order, followed by every missing index, in index order.
    ///
    /// Unusable tables and indexes are skipped, so an unusable database
    /// yields a partial set.
    pub fn build_sql(&self, catalog: &Catalog) -> Vec<String> {
        let mut statements: Vec<String> = self
            .tables
            .iter()
            .filter_map(|table| table.create_sql(catalog))
            .collect();
        statements.extend(
            self.indexes_with_tables()
                .filter_map(|(index, table)| index.build_sql(table, catalog)),
        );
        debug!(database = %self.name, statements = statements.len(), "Generated build SQL");
        statements
    }

    /// Returns the alter statements using the [`TextualComparator`].
    pub fn alter_sql(&self, catalog: &Catalog) -> Vec<String> {
        self.alter_sql_with(catalog, &TextualComparator)
    }

    /// Returns the column additions of every table, in table order,
    /// followed by the rebuilds of every changed index, in index order.
    pub fn alter_sql_with(&self, catalog: &Catalog, comparator: &dyn IndexComparator) -> Vec<String> {
        let mut statements: Vec<String> = self
            .tables
            .iter()
            .flat_map(|table| table.alter_sql(catalog))
            .collect();
        statements.extend(
            self.indexes_with_tables()
                .flat_map(|(index, table)| index.alter_sql(table, catalog, comparator)),
        );
        debug!(database = %self.name, statements = statements.len(), "Generated alter SQL");
        statements
    }

    /// Renders the schema as approximate MySQL, one marked block per table
    /// followed by the index statements.
    ///
    /// Returns an empty string for an unusable database.
    pub fn export_schema_sql(&self) -> String {
        if !self.is_usable() {
            debug!(database = %self.name, "Skipping schema export for unusable database");
            return String::new();
        }
        let mut sql = String::new();
        for table in &self.tables {
            sql.push_str(&format!("-- begin table {}\n", table.name()));
            sql.push_str(&table.export_create());
            sql.push_str(&format!("\n-- end table {}\n", table.name()));
        }
        for index in &self.indexes {
            sql.push_str(&index.export_create());
            sql.push('\n');
        }
        sql
    }
}

fn join_reasons(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
