//! Definition problems and validation results.
//!
//! Structural problems in a pseudo schema are values, not errors: every
//! entity exposes a pure `validate()` that returns a [`Validation`], which
//! is either [`Validation::Valid`] or the full list of [`Problem`]s found.
//! Validation never stops at the first problem, so a caller fixing a
//! definition sees everything that is wrong with it at once.
//!
//! # Examples
//!
//! ```
//! use pseudo_schema_core::*;
//!
//! let table = Table::new("users");
//! let validation = table.validate();
//! assert!(!validation.is_valid());
//! assert!(validation
//!     .problems()
//!     .iter()
//!     .any(|p| matches!(p, Problem::NoColumns { .. })));
//! ```

use thiserror::Error;

/// A structural problem detected while validating a pseudo schema.
///
/// Each variant has a stable [`code`](Problem::code); the `Display` output
/// starts with that code followed by the context of the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    /// Column name is empty.
    #[error("invalid column name - must be at least 1 character in length")]
    InvalidColumnName,
    /// Table has no columns.
    #[error("no columns - table {table} must have at least 1 column")]
    NoColumns { table: String },
    /// Table name is empty.
    #[error("invalid table name - must be at least 1 character in length")]
    InvalidTableName,
    /// A column of the table is itself unusable.
    #[error("unusable column - column {column:?} of table {table} is unusable")]
    UnusableColumn { table: String, column: String },
    /// Two columns of the table share a name.
    #[error("duplicate column - column {column} at position {first} is the same as position {second} in table {table}")]
    DuplicateColumn {
        table: String,
        column: String,
        first: usize,
        second: usize,
    },
    /// Index name is empty.
    #[error("invalid index name - must be at least 1 character in length (table {table})")]
    InvalidIndexName { table: String },
    /// The table an index is built on is unusable.
    #[error("unusable index table - table {table} of index {index} is unusable")]
    IndexTableUnusable { index: String, table: String },
    /// The table an index is built on has no name.
    #[error("invalid index table name - index {index} refers to a table without a name")]
    IndexTableNameEmpty { index: String },
    /// An index column has no name.
    #[error("invalid index column name - column {position} of {count} in index {index} has no name")]
    IndexColumnNameEmpty {
        index: String,
        position: usize,
        count: usize,
    },
    /// An index column is not a column of the index's table.
    #[error("column not in table - column {column} of index {index} must be a column of table {table}")]
    IndexColumnNotInTable {
        index: String,
        column: String,
        table: String,
    },
    /// Index column count differs from sort order count.
    #[error("sort order mismatch - index {index} has {columns} column(s) but {orders} sort order(s)")]
    SortOrderMismatch {
        index: String,
        columns: usize,
        orders: usize,
    },
    /// An index refers to a table the database does not contain.
    #[error("unknown index table - index {index} refers to table {table} which is not in the database")]
    UnknownIndexTable { index: String, table: String },
    /// Database has no tables.
    #[error("no tables - database must have at least 1 table")]
    NoTables,
    /// Database name is empty.
    #[error("invalid database name - must be at least 1 character in length")]
    InvalidDatabaseName,
    /// A table of the database is unusable.
    #[error("unusable table - table {table} is unusable")]
    UnusableTable { table: String },
    /// An index of the database is unusable.
    #[error("unusable index - index {index} is unusable: {reasons}")]
    UnusableIndex { index: String, reasons: String },
}

impl Problem {
    /// Returns the stable code identifying the kind of problem.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidColumnName => "invalid column name",
            Self::NoColumns { .. } => "no columns",
            Self::InvalidTableName => "invalid table name",
            Self::UnusableColumn { .. } => "unusable column",
            Self::DuplicateColumn { .. } => "duplicate column",
            Self::InvalidIndexName { .. } => "invalid index name",
            Self::IndexTableUnusable { .. } => "unusable index table",
            Self::IndexTableNameEmpty { .. } => "invalid index table name",
            Self::IndexColumnNameEmpty { .. } => "invalid index column name",
            Self::IndexColumnNotInTable { .. } => "column not in table",
            Self::SortOrderMismatch { .. } => "sort order mismatch",
            Self::UnknownIndexTable { .. } => "unknown index table",
            Self::NoTables => "no tables",
            Self::InvalidDatabaseName => "invalid database name",
            Self::UnusableTable { .. } => "unusable table",
            Self::UnusableIndex { .. } => "unusable index",
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Validation {
    /// No problems were found.
    #[default]
    Valid,
    /// One or more problems were found, in detection order.
    Invalid(Vec<Problem>),
}

impl Validation {
    /// Builds a validation result from accumulated problems.
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        if problems.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(problems)
        }
    }

    /// Returns `true` when no problems were found.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the problems found (empty when valid).
    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::Valid => &[],
            Self::Invalid(problems) => problems,
        }
    }

    /// Consumes the result, returning the problems found.
    pub fn into_problems(self) -> Vec<Problem> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(problems) => problems,
        }
    }

    /// Renders the problems as newline separated messages.
    ///
    /// Returns an empty string when valid.
    pub fn message(&self) -> String {
        join_messages(self.problems())
    }
}

pub(crate) fn join_messages(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_empty_problems_is_valid() {
        let validation = Validation::from_problems(Vec::new());
        assert!(validation.is_valid());
        assert!(validation.problems().is_empty());
        assert_eq!(validation.message(), "");
    }

    #[test]
    fn test_message_joins_every_problem() {
        let validation = Validation::from_problems(vec![
            Problem::InvalidTableName,
            Problem::NoColumns {
                table: "users".to_string(),
            },
        ]);
        assert!(!validation.is_valid());
        let message = validation.message();
        assert_eq!(message.lines().count(), 2);
        assert!(message.starts_with("invalid table name"));
        assert!(message.contains("no columns - table users"));
    }

    #[test]
    fn test_display_starts_with_code() {
        let problems = [
            Problem::InvalidColumnName,
            Problem::DuplicateColumn {
                table: "t".to_string(),
                column: "a".to_string(),
                first: 0,
                second: 1,
            },
            Problem::SortOrderMismatch {
                index: "ix".to_string(),
                columns: 2,
                orders: 1,
            },
            Problem::UnusableIndex {
                index: "ix".to_string(),
                reasons: "none".to_string(),
            },
        ];
        for problem in problems {
            assert!(problem.to_string().starts_with(problem.code()));
        }
    }
}
