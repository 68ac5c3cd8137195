//! Error types for vra-core.

use thiserror::Error;

use crate::types::Identifier;

/// All errors that can arise from registry operations.
///
/// Every variant is a distinct outcome: callers can tell "record not found"
/// apart from "storage unreachable" and decide whether a retry makes sense.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed construction arguments, detected before any I/O.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Storage matched zero records for a targeted mutation.
    #[error("no record matches identifier {id}")]
    NotFound { id: Identifier },

    /// The storage collaborator failed to carry out the primitive.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl RegistryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RegistryError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Failures reported by a [`Storage`](crate::storage::Storage) implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection or transport failure to the collaborator.
    #[error("storage unreachable: {reason}")]
    Unreachable { reason: String },

    /// A stored document does not follow the record mapping.
    #[error("malformed document: {reason}")]
    Malformed { reason: String },

    /// Backend-specific failure (file I/O, codec, task join, ...).
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        StorageError::Malformed {
            reason: reason.into(),
        }
    }
}
