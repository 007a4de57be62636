/// Structured error types for medbook-core.
///
/// Two families live here: `ValidationError` for caller input that can be
/// rejected before touching the database, and `QueryError` for structural
/// misuse of the query builder. `ConfigError` covers configuration loading.
use std::path::PathBuf;
use thiserror::Error;

/// Caller input that cannot be turned into a query.
///
/// Surfaced at the HTTP boundary as 400.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Column is not part of the entity's allow-list
    #[error("unknown column '{column}' for {entity}")]
    UnknownColumn { entity: &'static str, column: String },

    /// Column exists but cannot be written by the caller
    #[error("column '{column}' of {entity} is not writable")]
    ReadOnlyColumn { entity: &'static str, column: String },

    /// Value does not parse as the column's kind
    #[error("invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Pagination parameter is not a number
    #[error("invalid {param} '{value}': expected a non-negative integer")]
    InvalidPagination { param: &'static str, value: String },

    /// Delete mode is neither soft nor hard
    #[error("invalid delete mode '{0}': expected 'soft' or 'hard'")]
    InvalidDeleteMode(String),

    /// Request body could not be decoded
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Structural misuse of the query builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("table name cannot be empty")]
    EmptyTable,

    #[error("column name cannot be empty")]
    EmptyColumn,

    #[error("statement needs at least one column")]
    NoColumns,

    #[error("{columns} columns but {values} values")]
    ArityMismatch { columns: usize, values: usize },

    #[error("update statement has no assignments")]
    EmptyUpdate,
}

/// Configuration loading failed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    /// Create an invalid-configuration error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
