//! modelly-codegen: Generate C# data-access layers and Angular CRUD clients from table schemas
//!
//! This crate provides both a CLI tool and a library. From a list of table
//! descriptions (a JSON schema file or SQL Server `CREATE TABLE` DDL) it generates,
//! per table:
//!
//! - A C# backend: entity, data-access class with parameter-budgeted bulk
//!   statements, service interface and implementation, API controller
//! - An Angular client: entity interface, HTTP service, material table listing
//!   and insert/update/delete/get components
//!
//! # Usage in build.rs
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.modelly-codegen]
//! schema_file = "schema.json"
//! namespace = "Contoso.Api"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     modelly_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate CRUD code");
//! }
//! ```
//!
//! # Alternative: Programmatic Configuration
//!
//! ```rust,ignore
//! modelly_codegen::CodegenBuilder::new("schema.sql")
//!     .output_dir("generated")
//!     .namespace("Contoso.Api")
//!     .backend_only()
//!     .generate()?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! modelly-codegen --schema schema.sql --output ./generated generate
//! modelly-codegen --schema schema.sql plan --table Users --items 2500
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use codegen::{BudgetPolicy, CodeGenerator, TableArtifacts};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};

/// Main entry point: load the schema file, generate, and write unless `dry_run`
pub fn generate(config: &CodegenConfig) -> Result<BTreeMap<String, TableArtifacts>> {
    info!("Loading schema: {:?}", config.schema_file);
    let tables = parser::load_schema(&config.schema_file)?;
    info!("Found {} tables", tables.len());

    let generated = generate_tables(tables, config)?;

    let written = write_artifacts(generated.values(), &config.output_dir, config.dry_run)?;
    info!(
        "Code generation complete: {} file(s){}",
        written.len(),
        if config.dry_run { " (dry run)" } else { "" }
    );
    Ok(generated)
}

/// Filter and generate already-loaded tables without touching the filesystem
pub fn generate_tables(
    tables: Vec<parser::TableSchema>,
    config: &CodegenConfig,
) -> Result<BTreeMap<String, TableArtifacts>> {
    let tables = filter_tables(tables, &config.include_tables, &config.exclude_tables);
    debug!(
        "After filtering: {} tables (include={}, exclude={})",
        tables.len(),
        config.include_tables,
        config.exclude_tables
    );

    CodeGenerator::new(config).generate(&tables)
}

/// Write every artifact below `output_dir`, returning the target paths.
/// With `dry_run` nothing is written; the paths are only listed.
pub fn write_artifacts<'a>(
    tables: impl IntoIterator<Item = &'a TableArtifacts>,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for table in tables {
        for artifact in &table.artifacts {
            let path = artifact
                .relative_path
                .split('/')
                .fold(output_dir.to_path_buf(), |p, segment| p.join(segment));

            if dry_run {
                info!("Would write {}", path.display());
            } else {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, &artifact.text)?;
                debug!("Wrote {}", path.display());
            }
            written.push(path);
        }
    }
    Ok(written)
}

/// Filter tables based on include/exclude patterns
fn filter_tables(
    tables: Vec<parser::TableSchema>,
    include: &str,
    exclude: &str,
) -> Vec<parser::TableSchema> {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<String> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(|s| s.trim().to_string()).collect()
    };
    let exclude_set: HashSet<String> = exclude
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    tables
        .into_iter()
        .filter(|t| {
            let name = &t.name;
            let included = include_all || include_set.contains(name);
            let excluded = exclude_set.contains(name);
            included && !excluded
        })
        .collect()
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the output root; each table gets `<table>/Net` and `<table>/Angular` below it
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Root namespace for tables that do not carry one
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.config.namespace = namespace.to_string();
        self
    }

    /// Database segment for tables that do not carry one
    pub fn database(mut self, database: &str) -> Self {
        self.config.database = database.to_string();
        self
    }

    /// Generate only the C# backend
    pub fn backend_only(mut self) -> Self {
        self.config.generate_client = false;
        self
    }

    /// Generate only the Angular client
    pub fn client_only(mut self) -> Self {
        self.config.generate_backend = false;
        self
    }

    /// Maximum bound parameters per generated statement
    pub fn param_budget(mut self, budget: usize) -> Self {
        self.config.param_budget = budget;
        self
    }

    pub fn budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.config.budget_policy = policy;
        self
    }

    /// Generate tables one after another instead of on the rayon pool
    pub fn sequential(mut self) -> Self {
        self.config.parallel = false;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the code
    pub fn generate(self) -> Result<BTreeMap<String, TableArtifacts>> {
        self.config.validate()?;
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.modelly-codegen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the schema file (required)
    schema_file: Option<String>,

    /// Tables to include (optional, defaults to all)
    #[serde(default)]
    include_tables: Vec<String>,

    /// Tables to exclude (optional)
    #[serde(default)]
    exclude_tables: Vec<String>,

    /// Root namespace (default: "Modelly")
    namespace: Option<String>,

    /// Database segment (default: "Main")
    database: Option<String>,

    /// Whether to generate the C# backend (default: true)
    generate_backend: Option<bool>,

    /// Whether to generate the Angular client (default: true)
    generate_client: Option<bool>,

    /// Output root, relative to the manifest (default: OUT_DIR)
    output_dir: Option<String>,

    /// Maximum bound parameters per statement (default: 1000)
    param_budget: Option<usize>,

    /// `compatible` or `exact` (default: compatible)
    budget_policy: Option<BudgetPolicy>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    #[serde(rename = "modelly-codegen")]
    modelly_codegen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.modelly-codegen]` in Cargo.toml
///
/// ```rust,ignore
/// // build.rs
/// fn main() {
///     modelly_codegen::generate_from_cargo_metadata()
///         .expect("Failed to generate CRUD code");
/// }
/// ```
///
/// Configure in Cargo.toml:
///
/// ```toml
/// [package.metadata.modelly-codegen]
/// schema_file = "schema.json"
/// include_tables = ["Users", "Orders"]
/// budget_policy = "exact"
/// ```
pub fn generate_from_cargo_metadata() -> Result<BTreeMap<String, TableArtifacts>> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;

    let cargo_toml_path = PathBuf::from(&manifest_dir).join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;

    let cargo_toml: CargoToml = toml::from_str(&cargo_toml_content).map_err(|e| {
        CodegenError::ConfigError(format!(
            "Failed to parse {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    let metadata_config = cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.modelly_codegen)
        .ok_or_else(|| {
            CodegenError::ConfigError(
                "Missing [package.metadata.modelly-codegen] section in Cargo.toml".into(),
            )
        })?;

    let schema_file = metadata_config.schema_file.ok_or_else(|| {
        CodegenError::ConfigError(
            "schema_file is required in [package.metadata.modelly-codegen]".into(),
        )
    })?;

    // Resolve schema_file relative to manifest dir
    let schema_path = PathBuf::from(&manifest_dir).join(&schema_file);

    let mut builder = CodegenBuilder::new(&schema_path);

    // Determine output directory (default to OUT_DIR)
    if let Some(dir) = metadata_config.output_dir {
        builder = builder.output_dir(PathBuf::from(&manifest_dir).join(dir));
    } else {
        let out_dir = std::env::var("OUT_DIR").map(PathBuf::from).map_err(|_| {
            CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
        })?;
        builder = builder.output_dir(out_dir);
    }

    // Apply table filters
    if !metadata_config.include_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .include_tables
            .iter()
            .map(|s| s.as_str())
            .collect();
        builder = builder.include_tables(&tables);
    }
    if !metadata_config.exclude_tables.is_empty() {
        let tables: Vec<&str> = metadata_config
            .exclude_tables
            .iter()
            .map(|s| s.as_str())
            .collect();
        builder = builder.exclude_tables(&tables);
    }

    if let Some(namespace) = metadata_config.namespace {
        builder = builder.namespace(&namespace);
    }
    if let Some(database) = metadata_config.database {
        builder = builder.database(&database);
    }

    // Apply generation options
    if let Some(false) = metadata_config.generate_backend {
        builder = builder.client_only();
    }
    if let Some(false) = metadata_config.generate_client {
        builder = builder.backend_only();
    }
    if let Some(budget) = metadata_config.param_budget {
        builder = builder.param_budget(budget);
    }
    if let Some(policy) = metadata_config.budget_policy {
        builder = builder.budget_policy(policy);
    }

    // Emit rerun-if-changed
    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    builder.generate()
}
