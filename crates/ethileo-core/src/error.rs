//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input rejected by a value object, entity mutator or row hydration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation that needs a store-assigned ID was given an unsaved entity.
    #[error("{0} has not been persisted")]
    NotPersisted(&'static str),

    /// A store-level constraint (unique key or event reference) rejected the
    /// write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
