//! Schema definition files.
//!
//! A definition describes a pseudo schema as data, so an application can
//! keep its schema in a file instead of building it in code.
//!
//! # Example YAML
//!
//! ```yaml
//! name: mydatabase
//! tables:
//!   - name: users
//!     columns:
//!       - standard_id: true
//!       - { name: name, type: TEXT }
//!       - { name: info, type: TEXT, default: "''" }
//! indexes:
//!   - name: username_index
//!     table: users
//!     columns: [{ name: name, order: asc }]
//! ```
//!
//! Files ending in `.yml` or `.yaml` are read as YAML, anything else as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use pseudo_schema_core::{Column, Database, Index, SortOrder, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DefinitionError, Result};

fn default_type() -> String {
    "TEXT".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One column of a table definition.
///
/// With `standard_id: true` every other field except `sort_order` is
/// ignored and the column is `_id INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Declared type, normalized to an affinity. Defaults to `TEXT`.
    #[serde(rename = "type", default = "default_type")]
    pub declared_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    /// Default value as SQL text; empty means none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub standard_id: bool,
}

impl ColumnDefinition {
    /// Builds the column this definition describes.
    pub fn to_column(&self) -> Column {
        let column = if self.standard_id {
            Column::standard_id()
        } else {
            Column::new(&self.name, &self.declared_type, self.primary_key, self.default.clone())
        };
        column.with_sort_order(self.sort_order)
    }
}

/// One table of a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn to_table(&self) -> Table {
        Table::with_columns(&self.name, self.columns.iter().map(ColumnDefinition::to_column))
    }
}

/// One column reference of an index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// One index of a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub table: String,
    pub columns: Vec<IndexColumnDefinition>,
    #[serde(default)]
    pub unique: bool,
}

/// A complete schema definition.
///
/// # Examples
///
/// ```
/// use pseudo_schema_db::SchemaDefinition;
///
/// let yaml = r#"
/// name: mydatabase
/// tables:
///   - name: users
///     columns:
///       - standard_id: true
///       - { name: name }
/// indexes:
///   - { name: username_index, table: users, columns: [{ name: name, order: desc }] }
/// "#;
/// let database = SchemaDefinition::from_yaml_str(yaml)
///     .unwrap()
///     .into_database()
///     .unwrap();
/// assert!(database.is_usable());
/// assert_eq!(database.indexes()[0].qualified_name(), "users.username_index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
}

impl SchemaDefinition {
    /// Loads a definition, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DefinitionError::IoError) if the file cannot be
    /// read, or [`YamlError`](DefinitionError::YamlError) /
    /// [`JsonError`](DefinitionError::JsonError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml" | "yaml")
        );
        debug!(path = %path.display(), yaml = is_yaml, "Loading schema definition");
        let definition = if is_yaml {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        Ok(definition)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the pseudo schema.
    ///
    /// Index columns are looked up by name in the index's table.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTable`](DefinitionError::UnknownTable) or
    /// [`UnknownColumn`](DefinitionError::UnknownColumn) when an index
    /// refers to something the definition does not declare.
    pub fn into_database(self) -> Result<Database> {
        let mut database = Database::with_tables(
            self.name,
            self.tables.iter().map(TableDefinition::to_table),
        );

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for index in self.indexes {
            let table = database
                .table(&index.table)
                .ok_or_else(|| DefinitionError::UnknownTable {
                    index: index.name.clone(),
                    table: index.table.clone(),
                })?;
            let mut columns = Vec::with_capacity(index.columns.len());
            let mut orders = Vec::with_capacity(index.columns.len());
            for column in &index.columns {
                let resolved =
                    table
                        .column(&column.name)
                        .ok_or_else(|| DefinitionError::UnknownColumn {
                            index: index.name.clone(),
                            table: index.table.clone(),
                            column: column.name.clone(),
                        })?;
                columns.push(resolved);
                orders.push(column.order);
            }
            indexes.push(Index::new(index.name, table, &columns, orders, index.unique));
        }
        database.add_indexes(indexes);

        debug!(
            database = %database.name(),
            tables = database.tables().len(),
            indexes = database.indexes().len(),
            "Built schema from definition"
        );
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pseudo_schema_core::Affinity;

    fn sample_yaml() -> &'static str {
        r#"
name: mydatabase
tables:
  - name: users
    columns:
      - standard_id: true
      - { name: name, type: TEXT }
      - { name: info, type: "varchar(255)", default: "''" }
  - name: userpropertylink
    columns:
      - { name: userref, type: INTEGER, primary_key: true }
      - { name: propertyref, type: INTEGER, primary_key: true }
indexes:
  - name: username_index
    table: users
    columns:
      - { name: name, order: asc }
      - { name: info, order: desc }
    unique: true
"#
    }

    #[test]
    fn test_parse_yaml() {
        let definition = SchemaDefinition::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(definition.name, "mydatabase");
        assert_eq!(definition.tables.len(), 2);
        assert!(definition.tables[0].columns[0].standard_id);
        assert_eq!(definition.indexes[0].columns[1].order, SortOrder::Descending);
    }

    #[test]
    fn test_into_database() {
        let database = SchemaDefinition::from_yaml_str(sample_yaml())
            .unwrap()
            .into_database()
            .unwrap();
        assert!(database.is_usable());
        let users = database.table("users").unwrap();
        assert_eq!(users.columns()[0].name(), "_id");
        assert_eq!(users.column("info").unwrap().affinity(), Affinity::Text);
        assert_eq!(users.column("info").unwrap().default_value(), "''");
        assert_eq!(
            database.indexes()[0].render_create(),
            "CREATE UNIQUE INDEX IF NOT EXISTS username_index ON users(name ASC, info DESC)"
        );
    }

    #[test]
    fn test_column_type_defaults_to_text() {
        let definition: ColumnDefinition = serde_json::from_str(r#"{"name": "notes"}"#).unwrap();
        assert_eq!(definition.to_column().affinity(), Affinity::Text);
        assert!(!definition.to_column().is_primary_key());
    }

    #[test]
    fn test_unknown_index_table() {
        let json = r#"{
            "name": "mydatabase",
            "tables": [{"name": "users", "columns": [{"standard_id": true}]}],
            "indexes": [{"name": "ix", "table": "missing", "columns": [{"name": "_id"}]}]
        }"#;
        let err = SchemaDefinition::from_json_str(json)
            .unwrap()
            .into_database()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownTable { ref table, .. } if table == "missing"));
    }

    #[test]
    fn test_unknown_index_column() {
        let json = r#"{
            "name": "mydatabase",
            "tables": [{"name": "users", "columns": [{"standard_id": true}]}],
            "indexes": [{"name": "ix", "table": "users", "columns": [{"name": "name"}]}]
        }"#;
        let err = SchemaDefinition::from_json_str(json)
            .unwrap()
            .into_database()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "index 'ix' refers to unknown column 'name' of table 'users'"
        );
    }

    #[test]
    fn test_table_without_columns_is_kept_but_unusable() {
        let database = SchemaDefinition::from_yaml_str("name: mydatabase\ntables:\n  - name: users\n")
            .unwrap()
            .into_database()
            .unwrap();
        assert!(!database.is_usable());
        assert!(database.all_problem_messages().contains("no columns"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let err = SchemaDefinition::from_yaml_str("name: [unterminated").unwrap_err();
        assert!(matches!(err, DefinitionError::YamlError(_)));
    }
}
