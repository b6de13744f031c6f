//! Error types for the store layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`fred`] and [`serde_json`] errors.

use cartograph_types::ErrorKind;

/// Errors that can occur while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Coarse classification of this error. Every store failure is a
    /// collaborator failure from the caller's point of view.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Dragonfly(_) | Self::Serialization(_) | Self::Unavailable(_) | Self::Config(_) => {
                ErrorKind::CollaboratorFailure
            }
        }
    }
}
