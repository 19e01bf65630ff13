//! Configuration settings for schemagen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{Result, SchemagenError};

/// Main configuration for a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Path to the T-SQL schema DDL file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Logical database name used in generated output
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Tasks to run, in order ("model", "seed")
    #[serde(default = "default_tasks")]
    pub tasks: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,

    /// Options for the model generator task
    #[serde(default)]
    pub model: ModelOptions,

    /// Options for the seed script generator task
    #[serde(default)]
    pub seed: SeedOptions,
}

/// Options for the model generator task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Output directory for generated struct files
    #[serde(default = "default_model_output_dir")]
    pub output_dir: PathBuf,

    /// Regex selecting tables to include; empty means all
    #[serde(default)]
    pub include_tables: Option<String>,

    /// Regex selecting tables to exclude
    #[serde(default)]
    pub exclude_tables: Option<String>,

    /// Template consulted for extra per-entity output; empty skips it
    #[serde(default = "default_traits_template")]
    pub traits_template: String,
}

/// Options for the seed script generator task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOptions {
    /// Output path of the seed script
    #[serde(default = "default_seed_output_file")]
    pub output_file: PathBuf,

    /// Table names or patterns to seed; `*` matches all
    #[serde(default = "default_seed_tables")]
    pub tables: Vec<String>,
}

// Default value functions for serde
fn default_database_name() -> String {
    defaults::DATABASE_NAME.to_string()
}
fn default_tasks() -> Vec<String> {
    defaults::TASKS.iter().map(|t| t.to_string()).collect()
}
fn default_model_output_dir() -> PathBuf {
    PathBuf::from(defaults::MODEL_OUTPUT_DIR)
}
fn default_traits_template() -> String {
    defaults::TRAITS_TEMPLATE.to_string()
}
fn default_seed_output_file() -> PathBuf {
    PathBuf::from(defaults::SEED_OUTPUT_FILE)
}
fn default_seed_tables() -> Vec<String> {
    vec![defaults::SEED_TABLES.to_string()]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            database_name: default_database_name(),
            tasks: default_tasks(),
            log_level: None,
            model: ModelOptions::default(),
            seed: SeedOptions::default(),
        }
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            output_dir: default_model_output_dir(),
            include_tables: None,
            exclude_tables: None,
            traits_template: default_traits_template(),
        }
    }
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            output_file: default_seed_output_file(),
            tables: default_seed_tables(),
        }
    }
}

impl GeneratorConfig {
    /// Create a default config for the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            SchemagenError::Config(format!(
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

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("schemagen").required(false));
        }

        // Override with environment variables (SCHEMAGEN_*)
        builder = builder.add_source(Environment::with_prefix("SCHEMAGEN").separator("_"));

        let config: GeneratorConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(SchemagenError::Config("schema_file is required".into()));
        }

        if !self.schema_file.exists() {
            return Err(SchemagenError::Config(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        for task in &self.tasks {
            if task != "model" && task != "seed" {
                return Err(SchemagenError::Config(format!("unknown task '{task}'")));
            }
        }

        if self.seed.tables.is_empty() {
            return Err(SchemagenError::Config(
                "seed.tables must name at least one table or '*'".into(),
            ));
        }

        Ok(())
    }
}
