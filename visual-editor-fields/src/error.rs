//! Error types for schema loading and engine configuration

use std::path::PathBuf;
use thiserror::Error;

/// Result type for fallible field operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors raised while loading schemas, records, or configuration.
///
/// Filtering, resolution, and summarization never fail; only the entry points
/// that parse external input return these.
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Configuration could not be extracted from its sources
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// A configuration value was present but unusable
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    /// Schema or record file has an extension we do not parse
    #[error("unsupported file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl From<figment::Error> for FieldsError {
    fn from(error: figment::Error) -> Self {
        FieldsError::Config(Box::new(error))
    }
}
