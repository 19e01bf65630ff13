//! schemagen: generate Rust model structs and seed SQL scripts from T-SQL
//! schema DDL
//!
//! The crate parses a schema script into an in-memory metadata graph —
//! schemas, tables, columns, foreign keys, indexes and triggers with full
//! cross-reference wiring — and renders that graph through generator
//! tasks. Removing an entity from the graph cascades to everything that
//! references it, so tasks can filter tables without leaving dangling
//! relationships behind.
//!
//! # Library usage
//!
//! ```rust,ignore
//! use schemagen::metadata::Table;
//! use schemagen::provider::build_metadata;
//!
//! let db = build_metadata("Shop", SCHEMA_DDL)?;
//! let order: &Table = db.find("[dbo].[Order]").unwrap();
//! for fk in order.foreign_keys() {
//!     println!("{} -> {}", fk.name(), fk.target_table());
//! }
//! ```
//!
//! # CLI usage
//!
//! ```bash
//! schemagen --config schemagen.toml generate
//! schemagen --schema schema.sql --output ./src/generated model
//! ```
//!
//! Configuration lives in a TOML file (see [`config::GeneratorConfig`]);
//! the `tasks` list selects which generators run. A failing task does not
//! stop the remaining tasks.

pub mod codegen;
pub mod config;
pub mod error;
pub mod metadata;
pub mod provider;
pub mod templates;

use tracing::{error, info};

pub use config::GeneratorConfig;
pub use error::{Result, SchemagenError};

use codegen::{generate_models, generate_seed, TimestampsTemplate};
use provider::MetadataProvider;
use templates::{DbTemplate, TemplateEngine};

/// Template registry with the built-in templates registered.
pub fn default_template_engine() -> TemplateEngine {
    let templates: Vec<Box<dyn DbTemplate>> = vec![Box::new(TimestampsTemplate)];
    TemplateEngine::new(templates)
}

/// Run the configured task list in order.
///
/// A task failure is reported and counted but does not stop the remaining
/// tasks; the caller decides what a non-zero failure count means.
pub fn run_tasks(config: &GeneratorConfig) -> Result<usize> {
    config.validate()?;
    let mut provider = MetadataProvider::new(&config.database_name, &config.schema_file);
    let engine = default_template_engine();

    let mut failures = 0;
    for task in &config.tasks {
        info!("running task '{task}'");
        if let Err(err) = run_task(task, &mut provider, &engine, config) {
            error!("task '{task}' failed: {err}");
            failures += 1;
        }
    }
    Ok(failures)
}

/// Run a single named task against the provider's cached graph.
pub fn run_task(
    name: &str,
    provider: &mut MetadataProvider,
    engine: &TemplateEngine,
    config: &GeneratorConfig,
) -> Result<()> {
    match name {
        "model" => generate_models(provider.metadata_mut()?, engine, &config.model),
        "seed" => generate_seed(provider.metadata()?, &config.seed),
        other => Err(SchemagenError::Config(format!("unknown task '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_tasks_continues_past_failures() {
        // A schema whose only FK relation is cyclic: the seed task fails,
        // the model task still runs.
        let ddl = r#"
            CREATE TABLE [dbo].[A] (
                [Id] INT NOT NULL PRIMARY KEY,
                [BId] INT NOT NULL,
                CONSTRAINT [FK_A_B] FOREIGN KEY ([BId]) REFERENCES [dbo].[B] ([Id])
            );
            CREATE TABLE [dbo].[B] (
                [Id] INT NOT NULL PRIMARY KEY,
                [AId] INT NOT NULL,
                CONSTRAINT [FK_B_A] FOREIGN KEY ([AId]) REFERENCES [dbo].[A] ([Id])
            );
        "#;
        let mut schema_file = tempfile::NamedTempFile::new().unwrap();
        schema_file.write_all(ddl.as_bytes()).unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let mut config = GeneratorConfig::default_with_schema(schema_file.path().to_path_buf());
        config.tasks = vec!["seed".to_string(), "model".to_string()];
        config.seed.output_file = out_dir.path().join("seed.sql");
        config.model.output_dir = out_dir.path().join("models");

        let failures = run_tasks(&config).unwrap();
        assert_eq!(failures, 1);
        assert!(out_dir.path().join("models").join("a.rs").exists());
        assert!(!out_dir.path().join("seed.sql").exists());
    }

    #[test]
    fn test_unknown_task_is_a_failure() {
        let mut schema_file = tempfile::NamedTempFile::new().unwrap();
        schema_file
            .write_all(b"CREATE TABLE T (Id INT NOT NULL);")
            .unwrap();

        let mut config = GeneratorConfig::default_with_schema(schema_file.path().to_path_buf());
        config.tasks = vec!["model".to_string()];

        let mut provider = MetadataProvider::new("Db", schema_file.path());
        let engine = default_template_engine();
        let err = run_task("publish", &mut provider, &engine, &config).unwrap_err();
        assert!(matches!(err, SchemagenError::Config(_)));
    }
}
