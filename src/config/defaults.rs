//! Default configuration values

pub const DATABASE_NAME: &str = "Database";

pub const TASKS: &[&str] = &["model", "seed"];

pub const MODEL_OUTPUT_DIR: &str = "src/generated/models";

/// Template consulted for extra per-entity output; empty disables it.
pub const TRAITS_TEMPLATE: &str = "model-traits";

pub const SEED_OUTPUT_FILE: &str = "seed/seed.sql";

/// Match-anything default for the seed table selection.
pub const SEED_TABLES: &str = "*";
