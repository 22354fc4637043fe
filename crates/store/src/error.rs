//! Error types for the ACME state store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Operational failures a store implementation can report.
///
/// Lookups that find nothing are not errors; they return `None` or `false`.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The backing storage could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("internal database error: {0}")]
    Internal(String),

    /// A status passed as text is not a canonical encoding.
    #[error(transparent)]
    InvalidStatus(#[from] StatusParseError),
}

/// A status string did not match any canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} status: {value:?}")]
pub struct StatusParseError {
    /// Which status enum was being parsed (e.g., "order").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configured database could not be opened.
    #[error("failed to open database: {0}")]
    Database(#[from] DatabaseError),
}
