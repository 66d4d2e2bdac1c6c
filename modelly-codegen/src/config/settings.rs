//! Configuration settings for modelly-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::codegen::{BudgetPolicy, ParamBudget};
use crate::error::{CodegenError, Result};

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the schema file (`.json` or SQL DDL)
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Root namespace applied to tables without one
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Database segment applied to tables without one
    #[serde(default = "default_database")]
    pub database: String,

    /// Whether to generate the C# backend
    #[serde(default = "default_generate_backend")]
    pub generate_backend: bool,

    /// Whether to generate the Angular client
    #[serde(default = "default_generate_client")]
    pub generate_client: bool,

    /// Output root directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum bound parameters per generated statement
    #[serde(default = "default_param_budget")]
    pub param_budget: usize,

    /// Per-row divisor of transactional bulk inserts/updates under the compatible policy
    #[serde(default = "default_transactional_divisor")]
    pub transactional_divisor: usize,

    /// How bulk chunk sizes are derived
    #[serde(default)]
    pub budget_policy: BudgetPolicy,

    /// Generate tables on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_namespace() -> String {
    defaults::NAMESPACE.to_string()
}
fn default_database() -> String {
    defaults::DATABASE.to_string()
}
fn default_generate_backend() -> bool {
    defaults::GENERATE_BACKEND
}
fn default_generate_client() -> bool {
    defaults::GENERATE_CLIENT
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_param_budget() -> usize {
    defaults::PARAM_BUDGET
}
fn default_transactional_divisor() -> usize {
    defaults::TRANSACTIONAL_DIVISOR
}
fn default_parallel() -> bool {
    defaults::PARALLEL
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            namespace: default_namespace(),
            database: default_database(),
            generate_backend: default_generate_backend(),
            generate_client: default_generate_client(),
            output_dir: default_output_dir(),
            param_budget: default_param_budget(),
            transactional_divisor: default_transactional_divisor(),
            budget_policy: BudgetPolicy::default(),
            parallel: default_parallel(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Budget settings threaded into every table model
    pub fn param_budget(&self) -> ParamBudget {
        ParamBudget {
            budget: self.param_budget,
            transactional_divisor: self.transactional_divisor,
            policy: self.budget_policy,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("modelly-codegen").required(false));
        }

        // Override with environment variables (MODELLY_CODEGEN_*); keys contain underscores
        builder = builder.add_source(
            Environment::with_prefix("MODELLY_CODEGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if !self.generate_backend && !self.generate_client {
            return Err(CodegenError::ValidationError(
                "at least one of generate_backend and generate_client must be true".into(),
            ));
        }

        if self.param_budget == 0 {
            return Err(CodegenError::ValidationError(
                "param_budget must be at least 1".into(),
            ));
        }

        if self.transactional_divisor == 0 {
            return Err(CodegenError::ValidationError(
                "transactional_divisor must be at least 1".into(),
            ));
        }

        if self.namespace.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "namespace must not be empty".into(),
            ));
        }

        if self.database.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "database must not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.include_tables, "*");
        assert_eq!(config.database, "Main");
        assert_eq!(config.param_budget, 1000);
        assert_eq!(config.transactional_divisor, 4);
        assert_eq!(config.budget_policy, BudgetPolicy::Compatible);
        assert!(config.generate_backend);
        assert!(config.generate_client);
        assert!(config.parallel);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = CodegenConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_budget() {
        let schema = tempfile::NamedTempFile::new().unwrap();
        let mut config = CodegenConfig::default_with_schema(schema.path().to_path_buf());
        assert!(config.validate().is_ok());

        config.param_budget = 0;
        assert!(matches!(
            config.validate(),
            Err(CodegenError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_requires_a_stack() {
        let schema = tempfile::NamedTempFile::new().unwrap();
        let mut config = CodegenConfig::default_with_schema(schema.path().to_path_buf());
        config.generate_backend = false;
        config.generate_client = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            schema_file = "schema.json"
            log_level = "debug"
            namespace = "Contoso.Api"
            param_budget = 2100
            budget_policy = "exact"
            generate_client = false
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.namespace, "Contoso.Api");
        assert!(!config.generate_client);

        let budget = config.param_budget();
        assert_eq!(budget.budget, 2100);
        assert_eq!(budget.transactional_divisor, 4);
        assert_eq!(budget.policy, BudgetPolicy::Exact);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"database = \"Sales\"\nparallel = false\n").unwrap();
        let config = CodegenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database, "Sales");
        assert!(!config.parallel);
    }
}
