//! Schema loading: SQL Server DDL via sqlparser-rs, or JSON table descriptions

use std::path::Path;

use serde::Deserialize;
use sqlparser::ast::{
    ColumnOption, Expr, Ident, IndexColumn, ObjectName, PrimaryKeyConstraint, Statement,
    TableConstraint,
};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::metadata::*;
use crate::error::Result;

/// Load table descriptions from a schema file.
///
/// `.json` files are read as table descriptions, anything else is parsed as DDL.
pub fn load_schema(path: &Path) -> Result<Vec<TableSchema>> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        debug!("Reading JSON schema {:?}", path);
        parse_json_schema(&content)
    } else {
        debug!("Parsing DDL schema {:?}", path);
        parse_schema(&content)
    }
}

/// Accepted JSON layouts: a bare array of tables, or a document with shared defaults
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Tables(Vec<TableSchema>),
    Document {
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default)]
        database: Option<String>,
        tables: Vec<TableSchema>,
    },
}

/// Parse a JSON schema description
pub fn parse_json_schema(json: &str) -> Result<Vec<TableSchema>> {
    let document: SchemaDocument = serde_json::from_str(json)?;
    let tables = match document {
        SchemaDocument::Tables(tables) => tables,
        SchemaDocument::Document {
            namespace,
            database,
            tables,
        } => tables
            .into_iter()
            .map(|mut table| {
                if table.namespace.is_empty() {
                    if let Some(ns) = &namespace {
                        table.namespace = ns.clone();
                    }
                }
                if table.database.is_none() {
                    table.database = database.clone();
                }
                table
            })
            .collect(),
    };
    Ok(tables)
}

/// Parse SQL Server `CREATE TABLE` statements into table descriptions
pub fn parse_schema(sql: &str) -> Result<Vec<TableSchema>> {
    let dialect = MsSqlDialect {};
    let statements = Parser::parse_sql(&dialect, sql)?;

    let mut tables = Vec::new();

    for stmt in statements {
        if let Statement::CreateTable(create_table) = stmt {
            tables.push(extract_table_schema(&create_table));
        }
    }

    Ok(tables)
}

/// Extract a table description from a CREATE TABLE statement
fn extract_table_schema(create: &sqlparser::ast::CreateTable) -> TableSchema {
    let name = extract_table_name(&create.name);

    let mut columns: Vec<ColumnSchema> = create.columns.iter().map(extract_column).collect();

    // Table-level PRIMARY KEY (...) flags the listed columns
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey(PrimaryKeyConstraint {
            columns: pk_cols, ..
        }) = constraint
        {
            for pk_col in pk_cols {
                let col_name = extract_ident_from_index_column(pk_col);
                if let Some(col) = columns
                    .iter_mut()
                    .find(|c| c.name.eq_ignore_ascii_case(&col_name))
                {
                    col.is_primary_key = true;
                }
            }
        }
    }

    TableSchema {
        name,
        namespace: String::new(),
        entity_class_name: None,
        database: None,
        columns,
    }
}

/// Extract a column description from a column definition
fn extract_column(col_def: &sqlparser::ast::ColumnDef) -> ColumnSchema {
    let mut column = ColumnSchema::new(
        extract_ident(&col_def.name),
        format!("{}", col_def.data_type).to_lowercase(),
    );

    for option in &col_def.options {
        match &option.option {
            ColumnOption::PrimaryKey(_) => {
                column.is_primary_key = true;
            }
            ColumnOption::DialectSpecific(tokens) => {
                let token_str = tokens
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_uppercase();
                if token_str.contains("IDENTITY") || token_str.contains("AUTO_INCREMENT") {
                    column.is_auto_increment = true;
                }
            }
            other => {
                // IDENTITY(seed, increment) renders with its keyword first
                if other.to_string().to_uppercase().starts_with("IDENTITY") {
                    column.is_auto_increment = true;
                }
            }
        }
    }

    column
}

/// Extract the unqualified table name from an ObjectName (`dbo.Users` -> `Users`)
fn extract_table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

/// Extract a string from an Ident, without brackets or quotes
fn extract_ident(ident: &Ident) -> String {
    ident.value.clone()
}

/// Extract a column name string from an IndexColumn
fn extract_ident_from_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => format!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE [dbo].[Users] (
                [Id] INT IDENTITY(1,1) PRIMARY KEY,
                [Name] NVARCHAR(100) NOT NULL,
                [Email] NVARCHAR(MAX) NULL
            );
        "#;

        let tables = parse_schema(sql).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Users");
        assert_eq!(tables[0].columns.len(), 3);

        let id = &tables[0].columns[0];
        assert_eq!(id.name, "Id");
        assert_eq!(id.source_type, "int");
        assert!(id.is_primary_key);
        assert!(id.is_auto_increment);

        let email = &tables[0].columns[2];
        assert!(!email.is_primary_key);
        assert!(!email.is_auto_increment);
        assert!(email.source_type.starts_with("nvarchar"));
    }

    #[test]
    fn test_parse_table_level_primary_key() {
        let sql = r#"
            CREATE TABLE Orders (
                OrderCode INT NOT NULL,
                Total DECIMAL(10, 2) NOT NULL,
                PRIMARY KEY (OrderCode)
            );
        "#;

        let tables = parse_schema(sql).unwrap();
        let table = &tables[0];
        assert!(table.columns[0].is_primary_key);
        assert!(!table.columns[0].is_auto_increment);
        assert!(!table.columns[1].is_primary_key);
        assert_eq!(table.declared_primary_key().unwrap().name, "OrderCode");
    }

    #[test]
    fn test_parse_ignores_other_statements() {
        let sql = r#"
            CREATE TABLE Tags (Label NVARCHAR(50) NOT NULL);
            DROP TABLE Legacy;
        "#;

        let tables = parse_schema(sql).unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].declared_primary_key().is_none());
    }

    #[test]
    fn test_parse_invalid_sql() {
        assert!(parse_schema("CREATE TABLE (").is_err());
    }

    #[test]
    fn test_parse_json_array() {
        let json = r#"[
            { "name": "Users", "namespace": "Contoso", "columns": [
                { "name": "Id", "source_type": "int", "is_primary_key": true, "is_auto_increment": true }
            ] }
        ]"#;
        let tables = parse_json_schema(json).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].namespace, "Contoso");
        assert!(tables[0].columns[0].is_auto_increment);
    }

    #[test]
    fn test_parse_json_document_applies_defaults() {
        let json = r#"{
            "namespace": "Contoso.Api",
            "database": "Shop",
            "tables": [
                { "name": "Users", "columns": [ { "name": "Id", "source_type": "int" } ] },
                { "name": "Orders", "namespace": "Other", "database": "Sales",
                  "columns": [ { "name": "Id", "source_type": "int" } ] }
            ]
        }"#;
        let tables = parse_json_schema(json).unwrap();
        assert_eq!(tables[0].namespace, "Contoso.Api");
        assert_eq!(tables[0].database.as_deref(), Some("Shop"));
        assert_eq!(tables[1].namespace, "Other");
        assert_eq!(tables[1].database.as_deref(), Some("Sales"));
    }

    #[test]
    fn test_ddl_and_json_agree() {
        let sql = "CREATE TABLE Users (Id INT IDENTITY(1,1) PRIMARY KEY, Name NVARCHAR(MAX));";
        let json = r#"[{ "name": "Users", "columns": [
            { "name": "Id", "source_type": "int", "is_primary_key": true, "is_auto_increment": true },
            { "name": "Name", "source_type": "nvarchar(max)" }
        ] }]"#;

        let from_ddl = parse_schema(sql).unwrap();
        let from_json = parse_json_schema(json).unwrap();
        assert_eq!(from_ddl, from_json);
    }

    #[test]
    fn test_load_schema_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("schema.json");
        std::fs::write(
            &json_path,
            r#"[{ "name": "Users", "columns": [ { "name": "Id", "source_type": "int" } ] }]"#,
        )
        .unwrap();
        let sql_path = dir.path().join("schema.sql");
        std::fs::write(&sql_path, "CREATE TABLE Users (Id INT PRIMARY KEY);").unwrap();

        assert_eq!(load_schema(&json_path).unwrap()[0].name, "Users");
        assert!(load_schema(&sql_path).unwrap()[0].columns[0].is_primary_key);
    }
}
