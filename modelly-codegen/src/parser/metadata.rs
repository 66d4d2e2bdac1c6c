//! Schema description structures consumed by the generator

use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// Description of a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Dotted root namespace of the generated backend code (e.g. "Contoso.Api")
    #[serde(default)]
    pub namespace: String,

    /// Entity class name; the table name is used when absent
    #[serde(default)]
    pub entity_class_name: Option<String>,

    /// Database segment of the backend namespaces; the configured default is used when absent
    #[serde(default)]
    pub database: Option<String>,

    /// Columns in declaration order
    pub columns: Vec<ColumnSchema>,
}

/// Description of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,

    /// Source SQL type name (e.g. "int", "nvarchar", "varchar(max)")
    pub source_type: String,

    /// Whether the column is flagged as the primary key
    #[serde(default)]
    pub is_primary_key: bool,

    /// Whether the column is an identity / auto-increment column
    #[serde(default)]
    pub is_auto_increment: bool,
}

impl TableSchema {
    /// Create a table with no columns; namespace and entity name are left at their defaults
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            entity_class_name: None,
            database: None,
            columns: Vec::new(),
        }
    }

    /// Append a column (builder style)
    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Entity class name, defaulting to the table name
    pub fn entity_class(&self) -> &str {
        self.entity_class_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    /// Get a column by name (case-insensitive, like SQL Server identifiers)
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// First column flagged as primary key, if any
    pub fn declared_primary_key(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Reject schemas the generator cannot produce anything sensible for
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CodegenError::InvalidSchema(
                "table name must not be empty".into(),
            ));
        }
        if self.columns.is_empty() {
            return Err(CodegenError::InvalidSchema(format!(
                "table `{}` has no columns",
                self.name
            )));
        }
        if let Some(col) = self.columns.iter().find(|c| c.name.trim().is_empty()) {
            return Err(CodegenError::InvalidSchema(format!(
                "table `{}` has a column with an empty name (type `{}`)",
                self.name, col.source_type
            )));
        }
        Ok(())
    }
}

impl ColumnSchema {
    /// Create a plain, non-key column
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            is_primary_key: false,
            is_auto_increment: false,
        }
    }

    /// Mark the column as primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark the column as identity / auto-increment
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_class_defaults_to_table_name() {
        let mut table = TableSchema::new("Users", "Contoso");
        assert_eq!(table.entity_class(), "Users");

        table.entity_class_name = Some("User".to_string());
        assert_eq!(table.entity_class(), "User");

        table.entity_class_name = Some(String::new());
        assert_eq!(table.entity_class(), "Users");
    }

    #[test]
    fn test_validate_rejects_empty_columns() {
        let table = TableSchema::new("Users", "Contoso");
        let err = table.validate().unwrap_err();
        assert!(matches!(err, CodegenError::InvalidSchema(_)));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let table = TableSchema::new(" ", "Contoso").column(ColumnSchema::new("Id", "int"));
        assert!(matches!(
            table.validate(),
            Err(CodegenError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "name": "Users",
            "columns": [
                { "name": "Id", "source_type": "int", "is_primary_key": true },
                { "name": "Email", "source_type": "nvarchar" }
            ]
        }"#;
        let table: TableSchema = serde_json::from_str(json).unwrap();
        assert_eq!(table.namespace, "");
        assert!(table.columns[0].is_primary_key);
        assert!(!table.columns[0].is_auto_increment);
        assert!(!table.columns[1].is_primary_key);
        assert_eq!(table.declared_primary_key().unwrap().name, "Id");
    }

    #[test]
    fn test_get_column_is_case_insensitive() {
        let table =
            TableSchema::new("Users", "Contoso").column(ColumnSchema::new("Email", "nvarchar"));
        assert!(table.get_column("email").is_some());
        assert!(table.get_column("Missing").is_none());
    }
}
