//! Applying a pseudo schema to a live SQLite database.
//!
//! [`Migrator`] owns a connection and runs the two-phase protocol: `build`
//! creates whatever is missing, `alter` adds missing columns and rebuilds
//! changed indexes. Each phase opens an immediate transaction, reads the
//! catalog through it, generates its statements and runs them before
//! committing, so no other writer can change the schema in between.
//!
//! # Example
//!
//! ```no_run
//! use pseudo_schema_core::{Column, Database, Table};
//! use pseudo_schema_sqlite::Migrator;
//! use rusqlite::{Connection, Transaction, TransactionBehavior};
//!
//! let database = Database::with_tables(
//!     "mydatabase",
//!     vec![Table::with_columns("users", vec![Column::standard_id(), Column::text("name")])],
//! );
//!
//! let mut migrator = Migrator::new(Connection::open("app.db").unwrap());
//! let report = migrator.sync(&database).unwrap();
//! println!("{} statement(s) applied", report.len());
//! ```

use std::path::Path;

use pseudo_schema_core::{Catalog, Database, IndexComparator, TextualComparator};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::catalog::read_catalog;
use crate::error::{Result, SqliteError};

/// Runs build and alter statements for a [`Database`] against one connection.
///
/// Failed phases leave the database as it was: the transaction is dropped
/// without commit, which rolls it back.
pub struct Migrator {
    conn: Connection,
    comparator: Box<dyn IndexComparator>,
}

impl Migrator {
    /// Wraps an open connection, comparing indexes with [`TextualComparator`].
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            comparator: Box::new(TextualComparator),
        }
    }

    /// Opens (creating if needed) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening database");
        Ok(Self::new(Connection::open(path)?))
    }

    /// Replaces the index comparator used by [`alter`](Self::alter).
    pub fn with_comparator(mut self, comparator: impl IndexComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Reads the current catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        read_catalog(&self.conn)
    }

    /// Returns the build statements without running them.
    pub fn plan_build(&self, database: &Database) -> Result<Vec<String>> {
        Ok(database.build_sql(&self.catalog()?))
    }

    /// Returns the alter statements without running them.
    pub fn plan_alter(&self, database: &Database) -> Result<Vec<String>> {
        Ok(database.alter_sql_with(&self.catalog()?, self.comparator.as_ref()))
    }

    /// Creates every missing table and index in one transaction.
    pub fn build(&mut self, database: &Database) -> Result<ApplyReport> {
        warn_if_unusable(database, "build");
        self.apply("build", |catalog, _| database.build_sql(catalog))
    }

    /// Adds missing columns and rebuilds changed indexes in one transaction.
    ///
    /// Tables absent from the database are not created; run
    /// [`build`](Self::build) first.
    pub fn alter(&mut self, database: &Database) -> Result<ApplyReport> {
        warn_if_unusable(database, "alter");
        self.apply("alter", |catalog, comparator| {
            database.alter_sql_with(catalog, comparator)
        })
    }

    /// Runs [`build`](Self::build) then [`alter`](Self::alter).
    pub fn sync(&mut self, database: &Database) -> Result<SyncReport> {
        let build = self.build(database)?;
        let alter = self.alter(database)?;
        Ok(SyncReport { build, alter })
    }

    /// Returns what [`sync`](Self::sync) would run, without changing the
    /// database.
    ///
    /// The build statements are executed inside a transaction that is
    /// rolled back afterwards, so the alter plan is generated against the
    /// catalog build would leave behind.
    ///
    /// # Errors
    ///
    /// Returns [`StatementFailed`](SqliteError::StatementFailed) when a
    /// build statement is rejected, exactly as [`sync`](Self::sync) would.
    pub fn plan_sync(&mut self, database: &Database) -> Result<SyncReport> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let build = database.build_sql(&read_catalog(&tx)?);
        execute_all(&tx, "plan", &build)?;
        let alter = database.alter_sql_with(&read_catalog(&tx)?, self.comparator.as_ref());
        tx.rollback()?;
        debug!(
            build = build.len(),
            alter = alter.len(),
            "Planned sync, build rolled back"
        );
        Ok(SyncReport {
            build: ApplyReport { statements: build },
            alter: ApplyReport { statements: alter },
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migrator and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn apply<F>(&mut self, phase: &'static str, plan: F) -> Result<ApplyReport>
    where
        F: FnOnce(&Catalog, &dyn IndexComparator) -> Vec<String>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let statements = plan(&read_catalog(&tx)?, self.comparator.as_ref());
        if statements.is_empty() {
            debug!(phase, "Nothing to apply");
            return Ok(ApplyReport { statements });
        }
        execute_all(&tx, phase, &statements)?;
        tx.commit()?;
        info!(phase, statements = statements.len(), "Applied schema changes");
        Ok(ApplyReport { statements })
    }
}

fn execute_all(tx: &Transaction<'_>, phase: &'static str, statements: &[String]) -> Result<()> {
    for statement in statements {
        debug!(phase, sql = %statement, "Executing statement");
        tx.execute_batch(statement)
            .map_err(|source| SqliteError::StatementFailed {
                statement: statement.clone(),
                source,
            })?;
    }
    Ok(())
}

fn warn_if_unusable(database: &Database, phase: &'static str) {
    if !database.is_usable() {
        warn!(
            phase,
            database = %database.name(),
            problems = %database.all_problem_messages(),
            "Schema is not usable, applying partial statement set"
        );
    }
}

/// Statements executed by one phase, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub statements: Vec<String>,
}

impl ApplyReport {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// Result of [`Migrator::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub build: ApplyReport,
    pub alter: ApplyReport,
}

impl SyncReport {
    /// Returns `true` when neither phase had anything to do.
    pub fn is_empty(&self) -> bool {
        self.build.is_empty() && self.alter.is_empty()
    }

    /// Total number of statements executed.
    pub fn len(&self) -> usize {
        self.build.len() + self.alter.len()
    }
}
