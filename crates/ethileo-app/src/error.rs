//! Ethileo — application error types.

use ethileo_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the events engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A repository operation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
