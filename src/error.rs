//! Error types for schemagen

use thiserror::Error;

/// Result type alias for schemagen operations
pub type Result<T> = std::result::Result<T, SchemagenError>;

/// Errors that can occur while building the metadata graph or generating code
#[derive(Error, Debug)]
pub enum SchemagenError {
    #[error("An item with the key '{key}' already exists in the collection")]
    DuplicateKey { key: String },

    #[error("Metadata item not found: {0}")]
    ItemNotFound(String),

    #[error("Cannot order tables due to a cyclic foreign key relationship between: {}", tables.join(", "))]
    CyclicDependency { tables: Vec<String> },

    #[error("No template registered under the name '{0}'")]
    TemplateNotFound(String),

    #[error("Template '{template}' expects a {expected} item")]
    TemplateInputMismatch {
        template: String,
        expected: &'static str,
    },

    #[error("No host type mapping for column {column} of type '{data_type}'")]
    UnmappedDataType { column: String, data_type: String },

    #[error("Failed to parse SQL schema: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlparser::parser::ParserError> for SchemagenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        SchemagenError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for SchemagenError {
    fn from(err: config::ConfigError) -> Self {
        SchemagenError::Config(err.to_string())
    }
}
