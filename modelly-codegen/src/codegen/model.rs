//! Per-table intermediate model: every derived name, type and statement, computed once

use serde::Serialize;
use tracing::{debug, warn};

use super::batch::{BulkOperation, ColumnCounts, ConnectionVariant, ParamBudget};
use super::naming::{self, PrimaryKey, TableNames};
use super::sql::SqlTemplateBuilder;
use super::type_resolver::{Annotation, BackendType, ClientType, HtmlInputType, TypeResolver};
use crate::error::Result;
use crate::parser::{ColumnSchema, TableSchema};

/// Non-fatal findings recorded while modelling a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// No column was flagged primary key; `Id` is assumed
    PrimaryKeyFallback { table: String, assumed: String },
    /// Source type missing from the mapping tables; opaque fallbacks are used
    UnmappedType {
        table: String,
        column: String,
        source_type: String,
    },
    /// A full chunk binds more parameters than the budget allows
    BudgetExceeded {
        table: String,
        operation: String,
        transactional: bool,
        params: usize,
        budget: usize,
    },
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationWarning::PrimaryKeyFallback { table, assumed } => write!(
                f,
                "table `{}` has no primary key column; assuming `{}`",
                table, assumed
            ),
            GenerationWarning::UnmappedType {
                table,
                column,
                source_type,
            } => write!(
                f,
                "column `{}.{}` has unmapped type `{}`; using opaque fallback types",
                table, column, source_type
            ),
            GenerationWarning::BudgetExceeded {
                table,
                operation,
                transactional,
                params,
                budget,
            } => write!(
                f,
                "`{}{}` on `{}` binds up to {} parameters per statement (budget {})",
                operation,
                if *transactional { "WithTransaction" } else { "" },
                table,
                params,
                budget
            ),
        }
    }
}

/// One column with everything the renderers need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnModel {
    pub name: String,
    pub source_type: String,
    /// Lower-cased client field name
    pub field: String,
    pub label: String,
    pub backend: BackendType,
    pub client: ClientType,
    pub html_input: HtmlInputType,
    pub annotation: Option<Annotation>,
    /// Whether this column is the resolved key
    pub is_key: bool,
    pub is_auto_increment: bool,
}

impl ColumnModel {
    fn new(column: &ColumnSchema, key: &PrimaryKey) -> Self {
        Self {
            name: column.name.clone(),
            source_type: column.source_type.clone(),
            field: naming::to_field_name(&column.name),
            label: naming::to_label(&column.name),
            backend: TypeResolver::backend(&column.source_type),
            client: TypeResolver::client(&column.source_type),
            html_input: TypeResolver::html_input(&column.source_type),
            annotation: TypeResolver::annotation_for(column),
            is_key: key.excludes(&column.name),
            is_auto_increment: column.is_auto_increment,
        }
    }
}

/// Chunk sizes baked into the generated bulk methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSizes {
    pub get_multiple: usize,
    pub insert_multiple: usize,
    pub update_multiple: usize,
    pub delete_multiple: usize,
}

impl ChunkSizes {
    fn new(budget: &ParamBudget, variant: ConnectionVariant, columns: ColumnCounts) -> Self {
        Self {
            get_multiple: budget.chunk_size(BulkOperation::GetMultiple, variant, columns),
            insert_multiple: budget.chunk_size(BulkOperation::InsertMultiple, variant, columns),
            update_multiple: budget.chunk_size(BulkOperation::UpdateMultiple, variant, columns),
            delete_multiple: budget.chunk_size(BulkOperation::DeleteMultiple, variant, columns),
        }
    }

    pub fn get(&self, op: BulkOperation) -> usize {
        match op {
            BulkOperation::GetMultiple => self.get_multiple,
            BulkOperation::InsertMultiple => self.insert_multiple,
            BulkOperation::UpdateMultiple => self.update_multiple,
            BulkOperation::DeleteMultiple => self.delete_multiple,
        }
    }
}

/// Everything emitted for one table
#[derive(Debug, Clone)]
pub struct TableModel {
    pub names: TableNames,
    pub database: String,
    pub key: PrimaryKey,
    /// C# type of key parameters (`int` when the key is not a real column)
    pub key_backend: BackendType,
    pub key_client: ClientType,
    pub columns: Vec<ColumnModel>,
    pub sql: SqlTemplateBuilder,
    pub budget: ParamBudget,
    pub ambient_chunks: ChunkSizes,
    pub supplied_chunks: ChunkSizes,
    pub needs_sql_server_types: bool,
    pub warnings: Vec<GenerationWarning>,
}

impl TableModel {
    /// Validate a table and derive its model
    pub fn build(table: &TableSchema, default_database: &str, budget: ParamBudget) -> Result<Self> {
        table.validate()?;

        let mut warnings = Vec::new();
        let database = table
            .database
            .as_deref()
            .filter(|db| !db.trim().is_empty())
            .unwrap_or(default_database)
            .to_string();

        let key = naming::resolve_primary_key(table);
        if key.is_fallback() {
            warn!(
                "Table {} has no primary key column, assuming `{}`",
                table.name, key.name
            );
            warnings.push(GenerationWarning::PrimaryKeyFallback {
                table: table.name.clone(),
                assumed: key.name.clone(),
            });
        }

        for col in &table.columns {
            if !TypeResolver::is_known(&col.source_type) {
                warn!(
                    "Column {}.{} has unmapped type `{}`",
                    table.name, col.name, col.source_type
                );
                warnings.push(GenerationWarning::UnmappedType {
                    table: table.name.clone(),
                    column: col.name.clone(),
                    source_type: col.source_type.clone(),
                });
            }
        }

        let columns: Vec<ColumnModel> = table
            .columns
            .iter()
            .map(|c| ColumnModel::new(c, &key))
            .collect();

        let (key_backend, key_client) = match &key.source_type {
            Some(source) => (TypeResolver::backend(source), TypeResolver::client(source)),
            None => (BackendType::Int, ClientType::Number),
        };

        let sql = SqlTemplateBuilder::new(table, &key);
        let counts = sql.column_counts();

        for variant in [ConnectionVariant::Ambient, ConnectionVariant::Supplied] {
            for op in BulkOperation::ALL {
                if let Some(params) = budget.overflow(op, variant, counts) {
                    warn!(
                        "{} on {} ({:?}) binds up to {} parameters per statement, budget is {}",
                        op, table.name, variant, params, budget.budget
                    );
                    warnings.push(GenerationWarning::BudgetExceeded {
                        table: table.name.clone(),
                        operation: op.to_string(),
                        transactional: variant == ConnectionVariant::Supplied,
                        params,
                        budget: budget.budget,
                    });
                }
            }
        }

        debug!(
            "Modelled table {}: key={}, {} non-key of {} column(s)",
            table.name, key.name, counts.non_key, counts.total
        );

        Ok(Self {
            names: TableNames::new(table, &database),
            database,
            needs_sql_server_types: TypeResolver::needs_sql_server_types(table),
            ambient_chunks: ChunkSizes::new(&budget, ConnectionVariant::Ambient, counts),
            supplied_chunks: ChunkSizes::new(&budget, ConnectionVariant::Supplied, counts),
            key,
            key_backend,
            key_client,
            columns,
            sql,
            budget,
            warnings,
        })
    }

    /// Columns written by INSERT / UPDATE, in declaration order
    pub fn non_key_columns(&self) -> impl Iterator<Item = &ColumnModel> {
        self.columns.iter().filter(|c| !c.is_key)
    }

    pub fn chunks(&self, variant: ConnectionVariant) -> &ChunkSizes {
        match variant {
            ConnectionVariant::Ambient => &self.ambient_chunks,
            ConnectionVariant::Supplied => &self.supplied_chunks,
        }
    }
}
