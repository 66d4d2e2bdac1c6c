//! Main code generator orchestrator

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info};

use super::emitter::{emit_table, TableArtifacts};
use super::model::TableModel;
use crate::config::CodegenConfig;
use crate::error::{CodegenError, Result};
use crate::parser::TableSchema;

/// Main code generator: models every table and renders the selected stacks
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self { config }
    }

    /// Build the model of one table, filling in the configured namespace
    pub fn model(&self, table: &TableSchema) -> Result<TableModel> {
        let table = if table.namespace.trim().is_empty() {
            Cow::Owned(TableSchema {
                namespace: self.config.namespace.clone(),
                ..table.clone()
            })
        } else {
            Cow::Borrowed(table)
        };
        TableModel::build(&table, &self.config.database, self.config.param_budget())
    }

    /// Generate the artifacts of one table
    pub fn generate_table(&self, table: &TableSchema) -> Result<TableArtifacts> {
        let model = self.model(table)?;
        let artifacts = emit_table(
            &model,
            self.config.generate_backend,
            self.config.generate_client,
        );
        debug!(
            "Generated {} artifact(s) for table {}",
            artifacts.artifacts.len(),
            table.name
        );
        Ok(artifacts)
    }

    /// Generate every table, keyed by table name
    pub fn generate(&self, tables: &[TableSchema]) -> Result<BTreeMap<String, TableArtifacts>> {
        // Client stems and selectors are lower-cased, so names clash case-insensitively
        let mut seen = HashSet::new();
        for table in tables {
            if !seen.insert(table.name.to_lowercase()) {
                return Err(CodegenError::ValidationError(format!(
                    "table `{}` is defined more than once",
                    table.name
                )));
            }
        }

        info!(
            "Generating {} table(s) (backend={}, client={}, parallel={})",
            tables.len(),
            self.config.generate_backend,
            self.config.generate_client,
            self.config.parallel
        );

        let generated: Vec<TableArtifacts> = if self.config.parallel {
            tables
                .par_iter()
                .map(|t| self.generate_table(t))
                .collect::<Result<_>>()?
        } else {
            tables
                .iter()
                .map(|t| self.generate_table(t))
                .collect::<Result<_>>()?
        };

        Ok(generated
            .into_iter()
            .map(|a| (a.table.clone(), a))
            .collect())
    }
}
