//! Declarative SQLite schema model.
//!
//! This crate describes a *desired* schema (a "pseudo schema") as plain
//! values and generates the SQL that creates or reconciles a live database:
//!
//! - [`Column`]: name, storage [`Affinity`], key membership and default.
//! - [`Table`]: an ordered list of columns; renders `CREATE TABLE` and
//!   additive `ALTER TABLE ... ADD COLUMN` statements.
//! - [`Index`]: columns of one table with [`SortOrder`]s; rebuilt with
//!   `DROP INDEX` + `CREATE INDEX` when its definition changes.
//! - [`Database`]: the root, aggregating validation and SQL generation.
//!
//! Validation never fails fast: each `validate()` returns a [`Validation`]
//! listing every [`Problem`] found. Unusable entities generate no SQL.
//!
//! Generation never touches a database. The live state is passed in as a
//! [`Catalog`] snapshot, which drivers produce through [`CatalogSource`].
//! Index change detection goes through an [`IndexComparator`].
//!
//! # Example
//!
//! ```
//! use pseudo_schema_core::*;
//!
//! let users = Table::with_columns(
//!     "users",
//!     vec![Column::standard_id(), Column::text("name"), Column::text("info")],
//! );
//! let by_name = Index::single(
//!     "username_index",
//!     &users,
//!     users.column("name").unwrap(),
//!     SortOrder::Ascending,
//!     false,
//! );
//! let database = Database::with_tables_and_indexes("mydatabase", vec![users], vec![by_name]);
//! assert!(database.is_usable());
//!
//! // A brand new database needs everything.
//! let build = database.build_sql(&Catalog::new());
//! assert_eq!(build.len(), 2);
//!
//! // A live database that already has the table and an older index.
//! let live = Catalog::new()
//!     .with_table("users", vec![ColumnInfo::new(0, "_id", "INTEGER"), ColumnInfo::new(1, "name", "TEXT")])
//!     .with_index("username_index", "users", "CREATE INDEX username_index ON users(name ASC)");
//! assert!(database.build_sql(&live).is_empty());
//! assert_eq!(database.alter_sql(&live), vec!["ALTER TABLE users ADD COLUMN info TEXT"]);
//! ```

mod affinity;
mod catalog;
mod column;
mod compare;
mod database;
mod index;
mod table;
mod validate;

pub use affinity::Affinity;
pub use catalog::{
    Catalog, CatalogEntry, CatalogSource, ColumnInfo, EntryKind, RESERVED_METADATA_TABLE,
};
pub use column::{Column, STANDARD_ID_COLUMN};
pub use compare::{IndexComparator, TextualComparator};
pub use database::Database;
pub use index::{Index, IndexColumn, SortOrder};
pub use table::Table;
pub use validate::{Problem, Validation};
