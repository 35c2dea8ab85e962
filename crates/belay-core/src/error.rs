//! Error types for Belay core

use thiserror::Error;

use crate::level::ResourceKind;

/// Opaque failure reported by a resource store adapter
///
/// The catalog never retries these; retry policy belongs to the adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl StoreError {
    /// Create a new backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Errors raised while building or interpreting resources
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("{kind} is the root level and cannot have a parent")]
    UnexpectedParent { kind: ResourceKind },

    #[error("{kind} requires a parent id")]
    MissingParent { kind: ResourceKind },

    #[error("{kind} is orderable and requires first/next")]
    MissingLink { kind: ResourceKind },

    #[error("{kind} is not orderable and cannot carry first/next")]
    UnexpectedLink { kind: ResourceKind },

    #[error("Expected a {expected} but got a {found}")]
    KindMismatch {
        expected: ResourceKind,
        found: ResourceKind,
    },
}
