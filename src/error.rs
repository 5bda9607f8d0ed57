//! Error types for sve

use std::path::PathBuf;

use thiserror::Error;

use crate::rules::TemplateTable;

#[derive(Error, Debug)]
pub enum SveError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("unknown OS: {0}")]
    UnknownDistro(String),

    #[error("rule '{rule}' ({service}) requires {table} template '{name}', which is not defined")]
    MissingTemplate {
        service: String,
        rule: String,
        name: String,
        table: TemplateTable,
    },

    #[error("duplicate entry '{name}' in service '{service}'")]
    DuplicateRule { service: String, name: String },

    #[error("service '{0}' is defined more than once")]
    DuplicateService(String),

    #[error("invalid pattern for '{name}' ({service}): {source}")]
    InvalidPattern {
        service: String,
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("host query failed: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, SveError>;
