use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use pseudo_schema_core::{Catalog, Database, EntryKind};
use pseudo_schema_db::SchemaDefinition;
use pseudo_schema_sqlite::{ApplyReport, Migrator, catalog::read_catalog};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "pseudo-schema")]
#[command(version, about = "Declarative SQLite schema checking, migration and export")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a schema definition and report every problem.
    Check(SchemaArgs),
    /// Print the build and alter SQL for a database without running it.
    Plan(TargetArgs),
    /// Create missing tables and indexes.
    Build(TargetArgs),
    /// Add missing columns and rebuild changed indexes.
    Alter(TargetArgs),
    /// Build, then alter.
    Sync(TargetArgs),
    /// Print the schema as approximate MySQL.
    ExportSchema(SchemaArgs),
    /// Print the rows of the schema's tables as INSERT statements.
    ExportData(TargetArgs),
    /// Describe the tables and indexes of a database.
    Inspect(DbArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema definition file (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct DbArgs {
    /// SQLite database file path.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Schema definition file (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
    /// SQLite database file path.
    #[arg(long)]
    db: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install logger: {err}");
    }

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Plan(args) => run_plan(args),
        Command::Build(args) => run_apply(args, Phase::Build),
        Command::Alter(args) => run_apply(args, Phase::Alter),
        Command::Sync(args) => run_apply(args, Phase::Sync),
        Command::ExportSchema(args) => run_export_schema(args),
        Command::ExportData(args) => run_export_data(args),
        Command::Inspect(args) => run_inspect(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// check / export-schema
// ---------------------------------------------------------------------------

fn run_check(args: SchemaArgs) -> Result<(), String> {
    let database = load_database(&args.schema)?;
    if !database.is_usable() {
        return Err(format!(
            "schema '{}' is not usable:\n{}",
            database.name(),
            database.all_problem_messages()
        ));
    }
    println!(
        "Schema '{}' is usable: {} table(s), {} index(es).",
        database.name(),
        database.tables().len(),
        database.indexes().len()
    );
    Ok(())
}

fn run_export_schema(args: SchemaArgs) -> Result<(), String> {
    let database = load_database(&args.schema)?;
    if !database.is_usable() {
        return Err(format!(
            "cannot export unusable schema '{}':\n{}",
            database.name(),
            database.all_problem_messages()
        ));
    }
    print!("{}", database.export_schema_sql());
    Ok(())
}

// ---------------------------------------------------------------------------
// plan / build / alter / sync
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Phase {
    Build,
    Alter,
    Sync,
}

/// Prints what `sync` would run. The alter plan assumes the build
/// statements have run; they are rolled back afterwards.
fn run_plan(args: TargetArgs) -> Result<(), String> {
    let database = load_database(&args.schema)?;
    let conn = if args.db.exists() {
        open_connection(&args.db)?
    } else {
        debug!(db = %args.db.display(), "Database does not exist yet, planning against an empty one");
        rusqlite::Connection::open_in_memory()
            .map_err(|e| format!("Failed to open scratch database: {e}"))?
    };
    let plan = Migrator::new(conn)
        .plan_sync(&database)
        .map_err(|e| format!("Plan failed: {e}"))?;

    println!("-- build");
    print!("{}", format_statements(&plan.build.statements));
    println!("-- alter");
    print!("{}", format_statements(&plan.alter.statements));
    Ok(())
}

fn run_apply(args: TargetArgs, phase: Phase) -> Result<(), String> {
    let database = load_database(&args.schema)?;
    let mut migrator = Migrator::new(open_connection(&args.db)?);

    let reports: Vec<(&str, ApplyReport)> = match phase {
        Phase::Build => vec![(
            "build",
            migrator
                .build(&database)
                .map_err(|e| format!("Build failed: {e}"))?,
        )],
        Phase::Alter => vec![(
            "alter",
            migrator
                .alter(&database)
                .map_err(|e| format!("Alter failed: {e}"))?,
        )],
        Phase::Sync => {
            let report = migrator
                .sync(&database)
                .map_err(|e| format!("Sync failed: {e}"))?;
            vec![("build", report.build), ("alter", report.alter)]
        }
    };

    for (name, report) in &reports {
        print!("{}", format_statements(&report.statements));
        println!(
            "{name} complete: {} statement(s) applied to '{}'.",
            report.len(),
            args.db.display()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// export-data / inspect
// ---------------------------------------------------------------------------

fn run_export_data(args: TargetArgs) -> Result<(), String> {
    let database = load_database(&args.schema)?;
    if !args.db.exists() {
        return Err(format!("database '{}' does not exist", args.db.display()));
    }
    let conn = open_connection(&args.db)?;
    print!("{}", pseudo_schema_sqlite::export_data_sql(&conn, &database));
    Ok(())
}

fn run_inspect(args: DbArgs) -> Result<(), String> {
    if !args.db.exists() {
        return Err(format!("database '{}' does not exist", args.db.display()));
    }
    let conn = open_connection(&args.db)?;
    pseudo_schema_sqlite::log_database_info(&conn);

    let catalog = read_catalog(&conn).map_err(|e| format!("Failed to read catalog: {e}"))?;
    print!("{}", describe_catalog(&catalog));
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads a definition file and builds its pseudo schema.
fn load_database(path: &Path) -> Result<Database, String> {
    SchemaDefinition::load(path)
        .and_then(SchemaDefinition::into_database)
        .map_err(|e| format!("Failed to load schema '{}': {e}", path.display()))
}

fn open_connection(path: &Path) -> Result<rusqlite::Connection, String> {
    rusqlite::Connection::open(path)
        .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))
}

/// Renders statements one per line, each terminated by `;`.
fn format_statements(statements: &[String]) -> String {
    statements.iter().map(|s| format!("{s};\n")).collect()
}

/// Renders a catalog as an indented table/column/index listing.
fn describe_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for table in catalog.table_names() {
        out.push_str(&format!("table {table}\n"));
        for column in catalog.table_columns(table).unwrap_or_default() {
            let key = if column.pk > 0 { " PRIMARY KEY" } else { "" };
            out.push_str(&format!(
                "  column {} {}{key}\n",
                column.name, column.declared_type
            ));
        }
        for index in catalog
            .entries_of(EntryKind::Index)
            .filter(|e| e.table_name == table)
        {
            out.push_str(&format!(
                "  index {}: {}\n",
                index.name,
                index.sql.as_deref().unwrap_or("(automatic)")
            ));
        }
    }
    out
}
