//! CLI entry point for modelly-codegen

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use modelly_codegen::codegen::{BulkOperation, CodeGenerator, ConnectionVariant};
use modelly_codegen::config::CodegenConfig;
use modelly_codegen::parser::{self, TableSchema};

#[derive(Parser)]
#[command(name = "modelly-codegen")]
#[command(about = "Generate C# data-access layers and Angular CRUD components from table schemas")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to schema file, `.json` or SQL DDL (overrides config)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Output root directory (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all (backend and client)
    Generate,
    /// Generate only the C# backend
    Backend,
    /// Generate only the Angular client
    Client,
    /// Inspect schema (show parsed tables, resolved keys and types)
    Inspect,
    /// Show how bulk operations on a table are split into statements
    Plan {
        /// Table to plan for
        #[arg(short, long)]
        table: String,

        /// Number of items passed to the bulk call
        #[arg(short = 'n', long)]
        items: usize,

        /// Plan the caller-supplied transaction variants
        #[arg(long)]
        transactional: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    // File (explicit or ./modelly-codegen.toml) overlaid with MODELLY_CODEGEN_* variables
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Apply command-specific settings
    match &cli.command {
        Some(Commands::Backend) => {
            config.generate_client = false;
            config.generate_backend = true;
        }
        Some(Commands::Client) => {
            config.generate_backend = false;
            config.generate_client = true;
        }
        Some(Commands::Inspect) => {
            config.validate()?;
            return inspect_schema(&config);
        }
        Some(Commands::Plan {
            table,
            items,
            transactional,
        }) => {
            config.validate()?;
            return plan_table(&config, table, *items, *transactional);
        }
        _ => {}
    }

    // Validate configuration
    config.validate()?;

    info!("Generating code from schema: {:?}", config.schema_file);
    let generated = modelly_codegen::generate(&config)?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for table in generated.values() {
            for path in table.paths() {
                println!("  {}", config.output_dir.join(path).display());
            }
        }
    }

    let warnings: usize = generated.values().map(|t| t.warnings.len()).sum();
    info!(
        "Code generation completed successfully ({} table(s), {} warning(s))",
        generated.len(),
        warnings
    );
    Ok(())
}

fn load_table(config: &CodegenConfig, name: &str) -> Result<TableSchema> {
    parser::load_schema(&config.schema_file)?
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("table `{}` not found in {}", name, config.schema_file.display()))
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let tables = parser::load_schema(&config.schema_file)?;
    let generator = CodeGenerator::new(config);

    println!("Parsed {} tables:\n", tables.len());
    for table in &tables {
        let model = generator.model(table)?;
        println!("Table: {} (entity {})", table.name, model.names.entity);
        println!("  Namespace: {}", model.names.entities_namespace);
        println!("  Columns:");
        for col in &model.columns {
            let key = if col.is_key { " KEY" } else { "" };
            let identity = if col.is_auto_increment { " IDENTITY" } else { "" };
            println!(
                "    - {} {}{}{} -> C# {}, TS {}, input {}",
                col.name,
                col.source_type,
                key,
                identity,
                col.backend.to_type_string(),
                col.client.to_type_string(),
                col.html_input.to_type_string()
            );
        }
        println!(
            "  Primary Key: {}{}",
            model.key.name,
            if model.key.is_fallback() { " (assumed)" } else { "" }
        );
        for variant in [ConnectionVariant::Ambient, ConnectionVariant::Supplied] {
            let chunks = model.chunks(variant);
            println!(
                "  Chunk sizes ({:?}): get={}, insert={}, update={}, delete={}",
                variant,
                chunks.get_multiple,
                chunks.insert_multiple,
                chunks.update_multiple,
                chunks.delete_multiple
            );
        }
        if !model.warnings.is_empty() {
            println!("  Warnings:");
            for warning in &model.warnings {
                println!("    - {}", warning);
            }
        }
        println!();
    }

    Ok(())
}

fn plan_table(config: &CodegenConfig, name: &str, items: usize, transactional: bool) -> Result<()> {
    let table = load_table(config, name)?;
    let model = CodeGenerator::new(config).model(&table)?;
    let budget = config.param_budget();
    let variant = if transactional {
        ConnectionVariant::Supplied
    } else {
        ConnectionVariant::Ambient
    };

    println!(
        "Table {}: {} item(s), budget {} ({:?} policy, {:?})\n",
        table.name, items, budget.budget, budget.policy, variant
    );
    for op in BulkOperation::ALL {
        let statements = model.sql.plan_statements(&budget, op, variant, items);
        println!(
            "{} (chunk size {}): {} statement(s)",
            op,
            model.chunks(variant).get(op),
            statements.len()
        );
        for statement in &statements {
            println!("  {} {}", statement.range, statement.sql);
        }
        println!();
    }

    Ok(())
}
