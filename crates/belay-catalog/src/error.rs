//! Error types for the catalog

use belay_core::{ModelError, ResourceId, ResourceKind, StoreError};
use thiserror::Error;

fn join_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ResourceId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A sibling set whose `first`/`next` links do not form a single chain
///
/// Always the result of corrupted data or a race with a concurrent write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidOrdering {
    #[error(
        "Unable to build ordered list for children of resource {parent_id}. \
         Exactly one resource must be marked as first, but no resources are marked as first."
    )]
    NoFirst { parent_id: ResourceId },

    #[error(
        "Unable to build ordered list for children of resource {parent_id}. \
         Exactly one resource must be marked as first, but {} resources are marked as first: {}.",
        .ids.len(),
        join_ids(.ids)
    )]
    MultipleFirst {
        parent_id: ResourceId,
        ids: Vec<ResourceId>,
    },

    #[error(
        "Unable to build ordered list for children of resource {parent_id}. \
         Resource {id} has next resource {next}, which does not exist."
    )]
    DanglingNext {
        parent_id: ResourceId,
        id: ResourceId,
        next: ResourceId,
    },

    #[error(
        "Unable to build ordered list for children of resource {parent_id}. \
         Detected loop beginning with resource {id}."
    )]
    Loop {
        parent_id: ResourceId,
        id: ResourceId,
    },

    #[error(
        "Unable to build ordered list for children of resource {parent_id}. \
         Resources {} are not marked as first and are not pointed to by any other resource.",
        join_ids(.ids)
    )]
    Orphans {
        parent_id: ResourceId,
        ids: Vec<ResourceId>,
    },
}

impl InvalidOrdering {
    /// Parent whose children failed to order
    pub fn parent_id(&self) -> &ResourceId {
        match self {
            InvalidOrdering::NoFirst { parent_id }
            | InvalidOrdering::MultipleFirst { parent_id, .. }
            | InvalidOrdering::DanglingNext { parent_id, .. }
            | InvalidOrdering::Loop { parent_id, .. }
            | InvalidOrdering::Orphans { parent_id, .. } => parent_id,
        }
    }

    /// Ids named by the failure
    pub fn offending_ids(&self) -> Vec<&ResourceId> {
        match self {
            InvalidOrdering::NoFirst { .. } => Vec::new(),
            InvalidOrdering::MultipleFirst { ids, .. } | InvalidOrdering::Orphans { ids, .. } => {
                ids.iter().collect()
            }
            InvalidOrdering::DanglingNext { id, next, .. } => vec![id, next],
            InvalidOrdering::Loop { id, .. } => vec![id],
        }
    }
}

/// Broad category of a [`CatalogError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Stored data is inconsistent
    Consistency,
    /// A referenced resource does not exist or is hidden
    NotFound,
    /// The request itself does not fit the hierarchy
    Contract,
    /// The store adapter failed
    Store,
}

/// Errors returned by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidOrdering(#[from] InvalidOrdering),

    #[error("Unable to find {kind} with id {id}")]
    NotFound { kind: ResourceKind, id: ResourceId },

    #[error("Unable to find parent {kind} with id {id}")]
    ParentNotFound { kind: ResourceKind, id: ResourceId },

    #[error("Resource {kind} with id {id} does not exist")]
    ResourceNotFound { kind: ResourceKind, id: ResourceId },

    #[error("Cannot delete {kind} {id}: it still has {child} children")]
    NotEmpty {
        kind: ResourceKind,
        id: ResourceId,
        child: ResourceKind,
    },

    #[error("{child} is not a child level of {parent}")]
    InvalidChild {
        parent: ResourceKind,
        child: ResourceKind,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn not_found(kind: ResourceKind, id: &ResourceId) -> Self {
        Self::NotFound {
            kind,
            id: id.clone(),
        }
    }

    pub fn parent_not_found(kind: ResourceKind, id: &ResourceId) -> Self {
        Self::ParentNotFound {
            kind,
            id: id.clone(),
        }
    }

    pub fn resource_not_found(kind: ResourceKind, id: &ResourceId) -> Self {
        Self::ResourceNotFound {
            kind,
            id: id.clone(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CatalogError::InvalidOrdering(_) => ErrorClass::Consistency,
            CatalogError::NotFound { .. }
            | CatalogError::ParentNotFound { .. }
            | CatalogError::ResourceNotFound { .. } => ErrorClass::NotFound,
            CatalogError::NotEmpty { .. }
            | CatalogError::InvalidChild { .. }
            | CatalogError::Model(_) => ErrorClass::Contract,
            CatalogError::Store(_) => ErrorClass::Store,
        }
    }

    /// The catalog never retries; store faults carry the adapter's own policy
    pub fn is_retryable(&self) -> bool {
        false
    }
}
