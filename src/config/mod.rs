//! Configuration module

mod defaults;
mod settings;

pub use settings::{GeneratorConfig, ModelOptions, SeedOptions};
