//! CLI entry point for schemagen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use schemagen::config::GeneratorConfig;
use schemagen::metadata::MetadataItem;
use schemagen::provider::MetadataProvider;

#[derive(Parser)]
#[command(name = "schemagen")]
#[command(about = "Generate Rust model structs and seed SQL scripts from T-SQL schema DDL")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the schema DDL file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Logical database name (overrides config)
    #[arg(short, long)]
    database: Option<String>,

    /// Output directory for generated models (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all configured tasks
    Generate,
    /// Generate only model structs
    Model,
    /// Generate only the seed script
    Seed,
    /// Inspect the schema (print the loaded metadata graph)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = if let Some(config_path) = &cli.config {
        GeneratorConfig::from_file(config_path)?
    } else {
        GeneratorConfig::default()
    };

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
    if let Some(database) = cli.database {
        config.database_name = database;
    }
    if let Some(output) = cli.output {
        config.model.output_dir = output;
    }

    // Apply command-specific settings
    match &cli.command {
        Some(Commands::Model) => {
            config.tasks = vec!["model".to_string()];
        }
        Some(Commands::Seed) => {
            config.tasks = vec!["seed".to_string()];
        }
        Some(Commands::Inspect) => {
            return inspect_schema(&config);
        }
        _ => {}
    }

    config.validate()?;

    info!("generating from schema: {:?}", config.schema_file);
    let failures = schemagen::run_tasks(&config)?;
    if failures > 0 {
        anyhow::bail!("{failures} task(s) failed");
    }

    info!("generation completed successfully");
    Ok(())
}

fn inspect_schema(config: &GeneratorConfig) -> Result<()> {
    config.validate()?;
    let mut provider = MetadataProvider::new(&config.database_name, &config.schema_file);
    let db = provider.metadata()?;

    println!("Database: {}\n", db.name());
    for schema in db.schemas() {
        for table in schema.tables() {
            println!("Table: {}", table.fully_qualified_name());
            println!("  Columns:");
            for column in table.columns() {
                let nullable = if column.is_nullable() {
                    "NULL"
                } else {
                    "NOT NULL"
                };
                let key = if column.is_key() { " PK" } else { "" };
                let identity = if column.is_identity() { " IDENTITY" } else { "" };
                println!(
                    "    - {} {}{}{} {}",
                    column.name(),
                    column.data_type(),
                    key,
                    identity,
                    nullable
                );
            }
            if !table.foreign_keys().is_empty() {
                println!("  Foreign Keys:");
                for fk in table.foreign_keys() {
                    println!("    - {} -> {}", fk.name(), fk.target_table());
                }
            }
            if !table.incoming_foreign_keys().is_empty() {
                println!("  Referenced by:");
                for fk in table.incoming_foreign_keys() {
                    println!("    - {} ({})", fk.parent_table(), fk.name());
                }
            }
            if !table.indexes().is_empty() {
                println!("  Indexes:");
                for index in table.indexes() {
                    let unique = if index.is_unique() { "UNIQUE " } else { "" };
                    let columns: Vec<&str> =
                        index.columns().iter().map(|c| c.name()).collect();
                    println!("    - {}INDEX {} ({:?})", unique, index.name(), columns);
                }
            }
            println!();
        }
    }

    Ok(())
}
