//! Schema definition files for pseudo schemas.
//!
//! Lets an application describe its SQLite schema in a YAML or JSON file
//! and turn it into a [`Database`](pseudo_schema_core::Database) at startup.
//!
//! # Quick start
//!
//! ```no_run
//! use pseudo_schema_db::SchemaDefinition;
//!
//! let database = SchemaDefinition::load("schema.yaml")
//!     .unwrap()
//!     .into_database()
//!     .unwrap();
//! if !database.is_usable() {
//!     eprintln!("{}", database.all_problem_messages());
//! }
//! ```

mod definition;
mod error;

pub use definition::{
    ColumnDefinition, IndexColumnDefinition, IndexDefinition, SchemaDefinition, TableDefinition,
};
pub use error::{DefinitionError, Result};
