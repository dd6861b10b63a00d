//! SQLite driver for pseudo schemas.
//!
//! Connects the pure model in [`pseudo_schema_core`] to a live SQLite
//! database through [`rusqlite`]:
//!
//! - **`catalog`**: reads `sqlite_master` and `PRAGMA table_info` into a
//!   [`Catalog`](pseudo_schema_core::Catalog) snapshot
//! - **`migration`**: [`Migrator`], running build and alter statements
//!   transactionally
//! - **`export`**: best-effort `INSERT` export of live rows
//! - **`inspect`**: diagnostic logging and whole-table reads
//!
//! # Quick start
//!
//! ```
//! use pseudo_schema_core::{Column, Database, Table};
//! use pseudo_schema_sqlite::Migrator;
//! use rusqlite::Connection;
//!
//! let mut database = Database::with_tables(
//!     "mydatabase",
//!     vec![Table::with_columns("users", vec![Column::standard_id(), Column::text("name")])],
//! );
//!
//! let mut migrator = Migrator::new(Connection::open_in_memory().unwrap());
//! assert_eq!(migrator.sync(&database).unwrap().len(), 1);
//!
//! // Later: the definition grows a column.
//! database.table_mut("users").unwrap().add_column(Column::text("info"));
//! let report = migrator.sync(&database).unwrap();
//! assert_eq!(report.alter.statements, vec!["ALTER TABLE users ADD COLUMN info TEXT"]);
//! ```

pub mod catalog;
mod error;
pub mod export;
pub mod inspect;
mod migration;

pub use catalog::SqliteCatalog;
pub use error::{Result, SqliteError};
pub use export::export_data_sql;
pub use inspect::{RowSet, all_rows, log_database_info};
pub use migration::{ApplyReport, Migrator, SyncReport};
