//! Error types for medbook-server

use medbook_core::ConfigError;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

/// Startup and serving failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
