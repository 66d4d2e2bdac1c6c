//! Naming utilities for code generation

use heck::ToTitleCase;

use crate::parser::TableSchema;

/// Key name assumed when no column is flagged as primary key
pub const FALLBACK_PRIMARY_KEY: &str = "Id";

/// Entity class name: the configured entity name, or the table name verbatim
pub fn to_entity_name(table: &TableSchema) -> String {
    table.entity_class().to_string()
}

/// Convert a column name to a client-side field name (lower-cased)
pub fn to_field_name(column_name: &str) -> String {
    column_name.to_lowercase()
}

/// Client file stem for a table (lower-cased)
/// e.g., "OrderItems" -> "orderitems"
pub fn to_file_stem(table_name: &str) -> String {
    table_name.to_lowercase()
}

/// Human-readable label for form fields and table headers
/// e.g., "FirstName" -> "First Name", "created_at" -> "Created At"
pub fn to_label(column_name: &str) -> String {
    column_name.to_title_case()
}

/// Where the primary key name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeySource {
    Declared,
    Fallback,
}

/// Resolved primary key of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub name: String,
    pub source: PrimaryKeySource,
    /// Whether the key column is an identity column
    pub is_auto_increment: bool,
    /// Source type of the key column; `None` when the fallback key is not a real column
    pub source_type: Option<String>,
}

impl PrimaryKey {
    pub fn is_fallback(&self) -> bool {
        self.source == PrimaryKeySource::Fallback
    }

    /// Whether a column takes part in INSERT/UPDATE lists
    pub fn excludes(&self, column_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(column_name)
    }
}

/// Resolve the primary key: first flagged column, otherwise `Id`
pub fn resolve_primary_key(table: &TableSchema) -> PrimaryKey {
    if let Some(col) = table.declared_primary_key() {
        return PrimaryKey {
            name: col.name.clone(),
            source: PrimaryKeySource::Declared,
            is_auto_increment: col.is_auto_increment,
            source_type: Some(col.source_type.clone()),
        };
    }

    // A column that happens to be named Id still supplies its type and identity flag
    let implicit = table.get_column(FALLBACK_PRIMARY_KEY);
    PrimaryKey {
        name: implicit
            .map(|c| c.name.clone())
            .unwrap_or_else(|| FALLBACK_PRIMARY_KEY.to_string()),
        source: PrimaryKeySource::Fallback,
        is_auto_increment: implicit.map(|c| c.is_auto_increment).unwrap_or(false),
        source_type: implicit.map(|c| c.source_type.clone()),
    }
}

/// The four per-record client components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Insert,
    Update,
    Delete,
    Get,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Insert,
        ComponentKind::Update,
        ComponentKind::Delete,
        ComponentKind::Get,
    ];

    /// Lower-case form used in file names and selectors
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Insert => "insert",
            ComponentKind::Update => "update",
            ComponentKind::Delete => "delete",
            ComponentKind::Get => "get",
        }
    }

    /// Pascal-case form used in class names
    pub fn pascal(&self) -> &'static str {
        match self {
            ComponentKind::Insert => "Insert",
            ComponentKind::Update => "Update",
            ComponentKind::Delete => "Delete",
            ComponentKind::Get => "Get",
        }
    }
}

/// Every identifier shared between artifacts of one table, derived once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Table name as written in SQL and output folders
    pub table: String,
    /// Entity class / client interface name
    pub entity: String,
    /// Lower-cased table name used for client files and variables
    pub file_stem: String,
    pub access_class: String,
    pub service_interface: String,
    pub service_class: String,
    pub controller: String,
    /// Angular HTTP service class
    pub client_service: String,
    /// Variable holding the injected service (`_{stem}Service` in C#, `{stem}Service` in TS)
    pub service_var: String,
    pub mat_table_class: String,
    /// Route segment served by the controller
    pub api_route: String,
    pub config_namespace: String,
    pub entities_namespace: String,
    pub access_namespace: String,
    pub services_namespace: String,
    pub controllers_namespace: String,
}

impl TableNames {
    pub fn new(table: &TableSchema, database: &str) -> Self {
        let name = table.name.clone();
        let stem = to_file_stem(&table.name);
        let ns = table.namespace.trim_end_matches('.');

        Self {
            entity: to_entity_name(table),
            access_class: format!("{}Access", name),
            service_interface: format!("I{}Service", name),
            service_class: format!("{}Service", name),
            controller: format!("{}Controller", name),
            client_service: format!("{}Service", name),
            service_var: format!("{}Service", stem),
            mat_table_class: format!("{}MatTable", name),
            api_route: name.clone(),
            config_namespace: format!("{}.Database.Access", ns),
            entities_namespace: format!("{}.Database.Entities.{}", ns, database),
            access_namespace: format!("{}.Database.Access.{}", ns, database),
            services_namespace: format!("{}.Services.{}.{}", ns, database, name),
            controllers_namespace: format!("{}.Controllers", ns),
            file_stem: stem,
            table: name,
        }
    }

    /// Entity name qualified with its namespace
    pub fn qualified_entity(&self) -> String {
        format!("{}.{}", self.entities_namespace, self.entity)
    }

    /// e.g. "UsersInsertComponent"
    pub fn component_class(&self, kind: ComponentKind) -> String {
        format!("{}{}Component", self.entity, kind.pascal())
    }

    /// e.g. "app-users-insert"
    pub fn component_selector(&self, kind: ComponentKind) -> String {
        format!("app-{}-{}", self.file_stem, kind.as_str())
    }

    /// e.g. "users-insert"; both the folder and the file prefix
    pub fn component_stem(&self, kind: ComponentKind) -> String {
        format!("{}-{}", self.file_stem, kind.as_str())
    }

    /// e.g. "app-users-mat-table"
    pub fn mat_table_selector(&self) -> String {
        format!("app-{}-mat-table", self.file_stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ColumnSchema;

    fn make_table() -> TableSchema {
        TableSchema::new("Users", "Contoso.Api")
            .column(ColumnSchema::new("UserId", "int").primary_key().auto_increment())
            .column(ColumnSchema::new("FirstName", "nvarchar"))
    }

    #[test]
    fn test_to_field_name() {
        assert_eq!(to_field_name("FirstName"), "firstname");
        assert_eq!(to_field_name("id"), "id");
    }

    #[test]
    fn test_to_file_stem() {
        assert_eq!(to_file_stem("OrderItems"), "orderitems");
    }

    #[test]
    fn test_to_label() {
        assert_eq!(to_label("FirstName"), "First Name");
        assert_eq!(to_label("created_at"), "Created At");
        assert_eq!(to_label("Id"), "Id");
    }

    #[test]
    fn test_to_entity_name() {
        let mut table = make_table();
        assert_eq!(to_entity_name(&table), "Users");
        table.entity_class_name = Some("User".to_string());
        assert_eq!(to_entity_name(&table), "User");
    }

    #[test]
    fn test_resolve_declared_primary_key() {
        let pk = resolve_primary_key(&make_table());
        assert_eq!(pk.name, "UserId");
        assert_eq!(pk.source, PrimaryKeySource::Declared);
        assert!(pk.is_auto_increment);
        assert!(pk.excludes("userid"));
        assert!(!pk.excludes("FirstName"));
    }

    #[test]
    fn test_resolve_fallback_primary_key() {
        let table = TableSchema::new("Logs", "Contoso").column(ColumnSchema::new("Message", "text"));
        let pk = resolve_primary_key(&table);
        assert_eq!(pk.name, "Id");
        assert!(pk.is_fallback());
        assert!(!pk.is_auto_increment);
        assert!(pk.source_type.is_none());
    }

    #[test]
    fn test_fallback_uses_existing_id_column() {
        let table = TableSchema::new("Logs", "Contoso")
            .column(ColumnSchema::new("ID", "bigint").auto_increment())
            .column(ColumnSchema::new("Message", "text"));
        let pk = resolve_primary_key(&table);
        assert_eq!(pk.name, "ID");
        assert!(pk.is_fallback());
        assert!(pk.is_auto_increment);
        assert_eq!(pk.source_type.as_deref(), Some("bigint"));
    }

    #[test]
    fn test_table_names() {
        let mut table = make_table();
        table.entity_class_name = Some("User".to_string());
        let names = TableNames::new(&table, "Main");

        assert_eq!(names.entity, "User");
        assert_eq!(names.file_stem, "users");
        assert_eq!(names.access_class, "UsersAccess");
        assert_eq!(names.service_interface, "IUsersService");
        assert_eq!(names.controller, "UsersController");
        assert_eq!(names.service_var, "usersService");
        assert_eq!(names.entities_namespace, "Contoso.Api.Database.Entities.Main");
        assert_eq!(names.access_namespace, "Contoso.Api.Database.Access.Main");
        assert_eq!(names.services_namespace, "Contoso.Api.Services.Main.Users");
        assert_eq!(names.config_namespace, "Contoso.Api.Database.Access");
        assert_eq!(names.controllers_namespace, "Contoso.Api.Controllers");
        assert_eq!(names.qualified_entity(), "Contoso.Api.Database.Entities.Main.User");
    }

    #[test]
    fn test_component_names() {
        let names = TableNames::new(&make_table(), "Main");
        assert_eq!(names.component_class(ComponentKind::Insert), "UsersInsertComponent");
        assert_eq!(names.component_selector(ComponentKind::Get), "app-users-get");
        assert_eq!(names.component_stem(ComponentKind::Delete), "users-delete");
        assert_eq!(names.mat_table_selector(), "app-users-mat-table");
    }
}
