use std::io::Write;
use std::path::Path;

use pseudo_schema_core::Catalog;
use pseudo_schema_db::{DefinitionError, SchemaDefinition};

fn showcase_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/showcase.yaml"))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn test_load_showcase_yaml() {
    let database = SchemaDefinition::load(showcase_path())
        .unwrap()
        .into_database()
        .unwrap();
    assert_eq!(database.name(), "mydatabase");
    assert!(database.is_usable(), "{}", database.all_problem_messages());
    assert_eq!(database.table_names(), vec!["users", "property", "userpropertylink"]);
    assert_eq!(database.indexes().len(), 2);
}

#[test]
fn test_showcase_build_sql() {
    let database = SchemaDefinition::load(showcase_path())
        .unwrap()
        .into_database()
        .unwrap();
    assert_eq!(
        database.build_sql(&Catalog::new()),
        vec![
            "CREATE TABLE IF NOT EXISTS users (_id INTEGER PRIMARY KEY, name TEXT, info TEXT)",
            "CREATE TABLE IF NOT EXISTS property (_id INTEGER PRIMARY KEY, descr TEXT)",
            "CREATE TABLE IF NOT EXISTS userpropertylink (userref INTEGER, propertyref INTEGER, PRIMARY KEY (userref, propertyref))",
            "CREATE INDEX IF NOT EXISTS username_index ON users(name ASC)",
            "CREATE UNIQUE INDEX IF NOT EXISTS propertydescr_index ON property(descr ASC)",
        ]
    );
}

#[test]
fn test_load_json_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(
        br#"{"name": "notes", "tables": [{"name": "note", "columns": [{"standard_id": true}, {"name": "body"}]}]}"#,
    )
    .unwrap();
    file.flush().unwrap();

    let database = SchemaDefinition::load(&path).unwrap().into_database().unwrap();
    assert!(database.is_usable());
    assert_eq!(database.table("note").unwrap().columns().len(), 2);
}

#[test]
fn test_json_round_trip_through_yaml() {
    let definition = SchemaDefinition::load(showcase_path()).unwrap();
    let json = serde_json::to_string(&definition).unwrap();
    assert_eq!(SchemaDefinition::from_json_str(&json).unwrap(), definition);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaDefinition::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, DefinitionError::IoError(_)));
}

#[test]
fn test_yaml_content_in_json_file_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.txt");
    std::fs::write(&path, "name: mydatabase\n").unwrap();
    let err = SchemaDefinition::load(&path).unwrap_err();
    assert!(matches!(err, DefinitionError::JsonError(_)));
}
