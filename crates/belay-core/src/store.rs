//! Resource store abstraction

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::level::ResourceKind;
use crate::model::{Resource, ResourceId};

/// Key-value access to resources, with a secondary index on parent id
///
/// Implementations only move records in and out. They never filter by
/// visibility and never interpret `first`/`next`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a resource by id
    async fn get(&self, kind: ResourceKind, id: &ResourceId)
    -> Result<Option<Resource>, StoreError>;

    /// Fetch every resource of `kind` whose parent is `parent_id`
    ///
    /// Order of the returned resources is unspecified.
    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError>;

    /// Insert or overwrite a resource, keeping the parent index in sync
    async fn put(&self, resource: Resource) -> Result<(), StoreError>;

    /// Remove a resource; removing an absent id is not an error
    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ResourceStore + ?Sized> ResourceStore for Arc<S> {
    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        (**self).get(kind, id).await
    }

    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        (**self).get_by_parent(kind, parent_id).await
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        (**self).put(resource).await
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError> {
        (**self).delete(kind, id).await
    }
}
