//! In-memory resource store
//!
//! Suitable for tests, the CLI's scratch mode and anything that does not
//! need to survive a restart.

use std::collections::BTreeSet;

use async_trait::async_trait;
use belay_core::{Resource, ResourceId, ResourceKind, ResourceStore, StoreError};
use dashmap::DashMap;
use tracing::{debug, trace};

type LevelKey = (ResourceKind, ResourceId);

/// In-memory implementation of ResourceStore
///
/// Uses `DashMap` for concurrent access, with a secondary index from
/// `(kind, parent_id)` to the ids of the children at that level.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    /// Map from (kind, id) to resource
    resources: DashMap<LevelKey, Resource>,
    /// Index: (kind, parent id) -> child ids at that level
    by_parent: DashMap<LevelKey, BTreeSet<ResourceId>>,
}

impl InMemoryResourceStore {
    /// Create a new in-memory resource store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources across all levels
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Drop every stored resource
    pub fn clear(&self) {
        self.resources.clear();
        self.by_parent.clear();
        debug!("Cleared all resources from store");
    }

    fn unindex(&self, kind: ResourceKind, parent_id: &ResourceId, id: &ResourceId) {
        let key = (kind, parent_id.clone());
        let now_empty = match self.by_parent.get_mut(&key) {
            Some(mut ids) => {
                ids.remove(id);
                ids.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_parent.remove_if(&key, |_, ids| ids.is_empty());
        }
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        Ok(self
            .resources
            .get(&(kind, id.clone()))
            .map(|r| r.value().clone()))
    }

    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        let ids: Vec<ResourceId> = match self.by_parent.get(&(kind, parent_id.clone())) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .into_iter()
            .filter_map(|id| self.resources.get(&(kind, id)).map(|r| r.value().clone()))
            .collect())
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        let kind = resource.kind();
        let id = resource.id().clone();
        let parent_id = resource.parent_id().cloned();

        trace!(kind = %kind, id = %id, "Storing resource");

        let previous = self.resources.insert((kind, id.clone()), resource);

        // A re-parented resource must leave its old sibling set
        if let Some(old_parent) = previous.as_ref().and_then(|r| r.parent_id())
            && Some(old_parent) != parent_id.as_ref()
        {
            self.unindex(kind, old_parent, &id);
        }

        if let Some(parent_id) = parent_id {
            self.by_parent
                .entry((kind, parent_id))
                .or_default()
                .insert(id);
        }

        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError> {
        if let Some((_, resource)) = self.resources.remove(&(kind, id.clone())) {
            if let Some(parent_id) = resource.parent_id() {
                self.unindex(kind, parent_id, id);
            }
            trace!(kind = %kind, id = %id, "Deleted resource");
        }
        Ok(())
    }
}
