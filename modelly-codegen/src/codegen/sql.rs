//! Parameterized SQL Server statements embedded in the generated data-access layer

use serde::Serialize;

use super::batch::{BatchRange, BulkOperation, ColumnCounts, ConnectionVariant, ParamBudget};
use super::naming::PrimaryKey;
use crate::parser::TableSchema;

/// Placeholder replaced by the row position inside a chunk
pub const ROW_INDEX_PLACEHOLDER: &str = "{i}";

/// Placeholder replaced by the comma-separated id parameter list
pub const ID_LIST_PLACEHOLDER: &str = "{ids}";

/// One statement issued for one chunk of a bulk call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStatement {
    pub range: BatchRange,
    pub sql: String,
}

/// Bracket-quote an identifier
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Builds the SQL text of every CRUD shape for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplateBuilder {
    table: String,
    key: String,
    key_auto_increment: bool,
    /// Non-key columns in declaration order
    columns: Vec<String>,
    /// Every declared column, the key included
    declared_columns: usize,
}

impl SqlTemplateBuilder {
    pub fn new(table: &TableSchema, key: &PrimaryKey) -> Self {
        Self {
            table: table.name.clone(),
            key: key.name.clone(),
            key_auto_increment: key.is_auto_increment,
            columns: table
                .columns
                .iter()
                .filter(|c| !key.excludes(&c.name))
                .map(|c| c.name.clone())
                .collect(),
            declared_columns: table.columns.len(),
        }
    }

    /// Number of columns written by INSERT / UPDATE
    pub fn non_key_columns(&self) -> usize {
        self.columns.len()
    }

    /// Non-key and declared column counts used to size chunks
    pub fn column_counts(&self) -> ColumnCounts {
        ColumnCounts::new(self.columns.len(), self.declared_columns)
    }

    /// Whether INSERT returns the generated key
    pub fn returns_identity(&self) -> bool {
        self.key_auto_increment
    }

    fn quoted_table(&self) -> String {
        quote_ident(&self.table)
    }

    fn quoted_key(&self) -> String {
        quote_ident(&self.key)
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn value_list(&self, suffix: &str) -> String {
        self.columns
            .iter()
            .map(|c| format!("@{}{}", c, suffix))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn set_list(&self, suffix: &str) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} = @{}{}", quote_ident(c), c, suffix))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert_with_suffix(&self, suffix: &str, with_output: bool) -> String {
        let output = if with_output {
            format!(" OUTPUT INSERTED.{}", self.quoted_key())
        } else {
            String::new()
        };

        if self.columns.is_empty() {
            return format!("INSERT INTO {}{} DEFAULT VALUES", self.quoted_table(), output);
        }

        format!(
            "INSERT INTO {} ({}){} VALUES ({})",
            self.quoted_table(),
            self.column_list(),
            output,
            self.value_list(suffix)
        )
    }

    fn update_with_suffix(&self, suffix: &str) -> String {
        format!(
            "UPDATE {} SET {} WHERE {} = @{}{}",
            self.quoted_table(),
            self.set_list(suffix),
            self.quoted_key(),
            self.key,
            suffix
        )
    }

    fn id_list(&self, row_count: usize) -> String {
        (0..row_count)
            .map(|i| format!("@{}{}", self.key, i))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `SELECT * FROM [T] WHERE [pk] = @pk`
    pub fn get(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = @{}",
            self.quoted_table(),
            self.quoted_key(),
            self.key
        )
    }

    /// `SELECT * FROM [T]`
    pub fn get_all(&self) -> String {
        format!("SELECT * FROM {}", self.quoted_table())
    }

    /// `SELECT ... IN ({ids})`; `{ids}` is filled with one `@pk{i}` per id
    pub fn get_multiple_template(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE {} IN ({})",
            self.quoted_table(),
            self.quoted_key(),
            ID_LIST_PLACEHOLDER
        )
    }

    /// Parameter name of the i-th id in IN lists, e.g. `@Id{i}`
    pub fn id_param_template(&self) -> String {
        format!("@{}{}", self.key, ROW_INDEX_PLACEHOLDER)
    }

    pub fn render_get_multiple(&self, row_count: usize) -> String {
        self.get_multiple_template()
            .replace(ID_LIST_PLACEHOLDER, &self.id_list(row_count))
    }

    /// Single-row insert; carries `OUTPUT INSERTED.[pk]` only for identity keys
    pub fn insert(&self) -> String {
        self.insert_with_suffix("", self.key_auto_increment)
    }

    /// One row of a multi-row insert, parameters suffixed with `{i}`
    pub fn insert_row_template(&self) -> String {
        format!("{};", self.insert_with_suffix(ROW_INDEX_PLACEHOLDER, false))
    }

    pub fn render_insert_multiple(&self, row_count: usize) -> String {
        render_rows(&self.insert_row_template(), row_count)
    }

    /// `UPDATE [T] SET [c1] = @c1, [c2] = @c2 WHERE [pk] = @pk`
    pub fn update(&self) -> String {
        self.update_with_suffix("")
    }

    pub fn update_row_template(&self) -> String {
        format!("{};", self.update_with_suffix(ROW_INDEX_PLACEHOLDER))
    }

    pub fn render_update_multiple(&self, row_count: usize) -> String {
        render_rows(&self.update_row_template(), row_count)
    }

    /// `DELETE FROM [T] WHERE [pk] = @pk`
    pub fn delete(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = @{}",
            self.quoted_table(),
            self.quoted_key(),
            self.key
        )
    }

    pub fn delete_multiple_template(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} IN ({})",
            self.quoted_table(),
            self.quoted_key(),
            ID_LIST_PLACEHOLDER
        )
    }

    pub fn render_delete_multiple(&self, row_count: usize) -> String {
        self.delete_multiple_template()
            .replace(ID_LIST_PLACEHOLDER, &self.id_list(row_count))
    }

    /// Concrete statement for one chunk of `op`
    pub fn render(&self, op: BulkOperation, row_count: usize) -> String {
        match op {
            BulkOperation::GetMultiple => self.render_get_multiple(row_count),
            BulkOperation::InsertMultiple => self.render_insert_multiple(row_count),
            BulkOperation::UpdateMultiple => self.render_update_multiple(row_count),
            BulkOperation::DeleteMultiple => self.render_delete_multiple(row_count),
        }
    }

    /// Statements a bulk call of `item_count` items issues, in order
    pub fn plan_statements(
        &self,
        budget: &ParamBudget,
        op: BulkOperation,
        variant: ConnectionVariant,
        item_count: usize,
    ) -> Vec<BatchStatement> {
        budget
            .plan(op, variant, self.column_counts(), item_count)
            .iter()
            .map(|range| BatchStatement {
                range: *range,
                sql: self.render(op, range.len),
            })
            .collect()
    }
}

/// Concatenate `row_count` copies of a row template, numbering rows from 0
fn render_rows(row_template: &str, row_count: usize) -> String {
    (0..row_count)
        .map(|i| row_template.replace(ROW_INDEX_PLACEHOLDER, &i.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::BudgetPolicy;
    use crate::codegen::naming::resolve_primary_key;
    use crate::parser::ColumnSchema;

    fn make_table(auto_increment: bool) -> TableSchema {
        let mut id = ColumnSchema::new("Id", "int").primary_key();
        id.is_auto_increment = auto_increment;
        TableSchema::new("Users", "Contoso")
            .column(id)
            .column(ColumnSchema::new("Name", "nvarchar"))
            .column(ColumnSchema::new("Email", "nvarchar"))
    }

    fn make_builder(auto_increment: bool) -> SqlTemplateBuilder {
        let table = make_table(auto_increment);
        SqlTemplateBuilder::new(&table, &resolve_primary_key(&table))
    }

    #[test]
    fn test_single_row_statements() {
        let sql = make_builder(true);
        assert_eq!(sql.get(), "SELECT * FROM [Users] WHERE [Id] = @Id");
        assert_eq!(sql.get_all(), "SELECT * FROM [Users]");
        assert_eq!(sql.delete(), "DELETE FROM [Users] WHERE [Id] = @Id");
    }

    #[test]
    fn test_update_excludes_key_and_keeps_order() {
        let sql = make_builder(true);
        assert!(sql
            .update()
            .contains("SET [Name] = @Name, [Email] = @Email WHERE [Id] = @Id"));
        assert_eq!(
            sql.update(),
            "UPDATE [Users] SET [Name] = @Name, [Email] = @Email WHERE [Id] = @Id"
        );
    }

    #[test]
    fn test_insert_identity_clause_follows_auto_increment() {
        let auto = make_builder(true);
        assert_eq!(
            auto.insert(),
            "INSERT INTO [Users] ([Name],[Email]) OUTPUT INSERTED.[Id] VALUES (@Name,@Email)"
        );

        let manual = make_builder(false);
        assert_eq!(
            manual.insert(),
            "INSERT INTO [Users] ([Name],[Email]) VALUES (@Name,@Email)"
        );
        assert!(!manual.insert().contains("OUTPUT"));
        assert!(!manual.insert().contains("SCOPE_IDENTITY"));
    }

    #[test]
    fn test_multi_row_rendering() {
        let sql = make_builder(true);
        assert_eq!(
            sql.render_get_multiple(3),
            "SELECT * FROM [Users] WHERE [Id] IN (@Id0,@Id1,@Id2)"
        );
        assert_eq!(
            sql.render_delete_multiple(2),
            "DELETE FROM [Users] WHERE [Id] IN (@Id0,@Id1)"
        );
        assert_eq!(
            sql.render_insert_multiple(2),
            "INSERT INTO [Users] ([Name],[Email]) VALUES (@Name0,@Email0); \
             INSERT INTO [Users] ([Name],[Email]) VALUES (@Name1,@Email1);"
        );
        assert_eq!(
            sql.render_update_multiple(1),
            "UPDATE [Users] SET [Name] = @Name0, [Email] = @Email0 WHERE [Id] = @Id0;"
        );
    }

    #[test]
    fn test_row_templates() {
        let sql = make_builder(true);
        assert_eq!(sql.id_param_template(), "@Id{i}");
        assert_eq!(
            sql.insert_row_template(),
            "INSERT INTO [Users] ([Name],[Email]) VALUES (@Name{i},@Email{i});"
        );
        assert!(!sql.insert_row_template().contains("OUTPUT"));
        assert_eq!(
            sql.get_multiple_template(),
            "SELECT * FROM [Users] WHERE [Id] IN ({ids})"
        );
    }

    #[test]
    fn test_degenerate_table_does_not_panic() {
        let table = TableSchema::new("Counters", "Contoso")
            .column(ColumnSchema::new("Id", "int").primary_key().auto_increment());
        let sql = SqlTemplateBuilder::new(&table, &resolve_primary_key(&table));
        assert_eq!(sql.non_key_columns(), 0);
        assert_eq!(
            sql.insert(),
            "INSERT INTO [Counters] OUTPUT INSERTED.[Id] DEFAULT VALUES"
        );
        let _ = sql.update();
        assert_eq!(sql.render_insert_multiple(0), "");
        assert_eq!(sql.render_get_multiple(0), "SELECT * FROM [Counters] WHERE [Id] IN ()");
    }

    #[test]
    fn test_quote_ident_escapes_closing_bracket() {
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }

    #[test]
    fn test_plan_statements() {
        let sql = make_builder(true);
        let budget = ParamBudget {
            budget: 4,
            transactional_divisor: 4,
            policy: BudgetPolicy::Exact,
        };

        let statements =
            sql.plan_statements(&budget, BulkOperation::DeleteMultiple, ConnectionVariant::Ambient, 6);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].range, BatchRange { start: 0, len: 4 });
        assert_eq!(
            statements[1].sql,
            "DELETE FROM [Users] WHERE [Id] IN (@Id0,@Id1)"
        );

        // 2 non-key columns + key: one row per statement
        let updates =
            sql.plan_statements(&budget, BulkOperation::UpdateMultiple, ConnectionVariant::Supplied, 3);
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|s| s.sql.ends_with("@Id0;")));

        assert!(sql
            .plan_statements(&budget, BulkOperation::InsertMultiple, ConnectionVariant::Ambient, 0)
            .is_empty());
    }

    #[test]
    fn test_compatible_plan_counts_key_column() {
        let sql = make_builder(true);
        assert_eq!(sql.column_counts(), ColumnCounts { non_key: 2, total: 3 });

        // 1000 / 3 columns
        let updates = sql.plan_statements(
            &ParamBudget::default(),
            BulkOperation::UpdateMultiple,
            ConnectionVariant::Ambient,
            700,
        );
        let lens: Vec<usize> = updates.iter().map(|s| s.range.len).collect();
        assert_eq!(lens, [333, 333, 34]);
        assert!(updates[0].sql.contains("@Id332;"));
    }

    #[test]
    fn test_assumed_key_is_not_counted() {
        let table = TableSchema::new("Log", "Contoso")
            .column(ColumnSchema::new("Message", "text"))
            .column(ColumnSchema::new("At", "datetime"));
        let sql = SqlTemplateBuilder::new(&table, &resolve_primary_key(&table));
        assert_eq!(sql.column_counts(), ColumnCounts { non_key: 2, total: 2 });
    }
}
