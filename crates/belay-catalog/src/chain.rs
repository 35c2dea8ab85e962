//! Batch mutation of ordered chains
//!
//! Batch create writes a new chain tail first so that every `next` names an
//! id that already exists when its referrer is written. Batch delete checks
//! every id before deleting any of them. Neither is transactional against
//! the store: a store fault part way through leaves the writes made so far.

use std::sync::Arc;

use belay_core::{Attributes, ChainLink, ModelError, ResourceId, ResourceKind, ResourceStore};
use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::id::ResourceIdGenerator;

/// Creates and deletes runs of ordered siblings
#[derive(Clone)]
pub struct ChainMutator {
    store: Arc<dyn ResourceStore>,
    ids: ResourceIdGenerator,
    config: CatalogConfig,
}

impl ChainMutator {
    pub fn new(store: Arc<dyn ResourceStore>, config: CatalogConfig) -> Self {
        Self {
            store,
            ids: ResourceIdGenerator::new(),
            config,
        }
    }

    /// Create `specs` as a new chain of `kind` under `parent_id`
    ///
    /// Returns the generated ids in the order the specs were given. The
    /// parent must exist; otherwise nothing is created.
    #[instrument(skip(self, specs), fields(count = specs.len()))]
    pub async fn batch_create(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
        specs: Vec<Attributes>,
    ) -> Result<Vec<ResourceId>, CatalogError> {
        let parent_kind = validate_batch(kind, &specs)?;

        if self.store.get(parent_kind, parent_id).await?.is_none() {
            return Err(CatalogError::parent_not_found(parent_kind, parent_id));
        }

        let mut created: Vec<ResourceId> = Vec::with_capacity(specs.len());
        let mut next: Option<ResourceId> = None;

        for (i, attributes) in specs.into_iter().enumerate().rev() {
            let id = self.ids.generate(&attributes.id_prefix(Some(parent_id)));
            let link = ChainLink::new(i == 0, next.take());
            let resource =
                attributes.into_resource(id.clone(), Some(parent_id.clone()), Some(link))?;

            if let Err(e) = self.store.put(resource).await {
                warn!(
                    parent = %parent_id,
                    written = created.len(),
                    error = %e,
                    "Batch create failed part way through"
                );
                if self.config.rollback_failed_batches {
                    self.compensate(kind, &created).await;
                }
                return Err(e.into());
            }

            debug!(id = %id, position = i, "Created chain node");
            next = Some(id.clone());
            created.push(id);
        }

        created.reverse();
        info!(parent = %parent_id, count = created.len(), "Created chain");
        Ok(created)
    }

    async fn compensate(&self, kind: ResourceKind, created: &[ResourceId]) {
        for id in created {
            if let Err(e) = self.store.delete(kind, id).await {
                warn!(id = %id, error = %e, "Compensating delete failed");
            }
        }
        warn!(count = created.len(), "Rolled back partial chain");
    }

    /// Delete every id in `ids`, or none of them if any is missing
    ///
    /// Siblings that pointed at a deleted node are left as they are.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_delete(
        &self,
        kind: ResourceKind,
        ids: &[ResourceId],
    ) -> Result<(), CatalogError> {
        let found = try_join_all(ids.iter().map(|id| self.store.get(kind, id))).await?;
        if let Some((id, _)) = ids.iter().zip(&found).find(|(_, r)| r.is_none()) {
            return Err(CatalogError::resource_not_found(kind, id));
        }

        for id in ids {
            self.store.delete(kind, id).await?;
        }
        info!(count = ids.len(), "Deleted chain members");
        Ok(())
    }

    /// Delete every child of `parent_id` at level `kind`
    ///
    /// Returns how many children were removed.
    #[instrument(skip(self))]
    pub async fn delete_all_children(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<usize, CatalogError> {
        let parent_kind = kind.parent().ok_or(ModelError::UnexpectedParent { kind })?;
        if self.store.get(parent_kind, parent_id).await?.is_none() {
            return Err(CatalogError::parent_not_found(parent_kind, parent_id));
        }

        let children = self.store.get_by_parent(kind, parent_id).await?;
        for child in &children {
            self.store.delete(kind, child.id()).await?;
        }
        info!(count = children.len(), "Deleted all children");
        Ok(children.len())
    }
}

/// Every spec must be of the same orderable `kind`; returns the parent level
fn validate_batch(kind: ResourceKind, specs: &[Attributes]) -> Result<ResourceKind, ModelError> {
    if !kind.is_orderable() {
        return Err(ModelError::UnexpectedLink { kind });
    }
    if let Some(spec) = specs.iter().find(|s| s.kind() != kind) {
        return Err(ModelError::KindMismatch {
            expected: kind,
            found: spec.kind(),
        });
    }
    kind.parent().ok_or(ModelError::MissingParent { kind })
}
