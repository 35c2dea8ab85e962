//! Visibility filtering at the store boundary
//!
//! [`VisibilityFilter`] is the predicate; [`VisibleStore`] applies it once
//! to every fetch so the ordering and assembly code never sees a resource
//! the caller is not allowed to see.

use belay_core::{
    Caller, Resource, ResourceId, ResourceKind, ResourceStore, StoreError, Visibility,
};
use tracing::trace;

/// Decides whether a caller may see a resource
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter;

impl VisibilityFilter {
    /// Privileged callers see everything; everyone else sees stateless
    /// resources and `PUBLIC` stateful ones
    pub fn admits(caller: &Caller, resource: &Resource) -> bool {
        caller.is_privileged()
            || resource
                .visibility()
                .is_none_or(|state| state == Visibility::Public)
    }
}

/// A store view scoped to one caller
pub struct VisibleStore<'a> {
    store: &'a dyn ResourceStore,
    caller: &'a Caller,
}

impl<'a> VisibleStore<'a> {
    pub fn new(store: &'a dyn ResourceStore, caller: &'a Caller) -> Self {
        Self { store, caller }
    }

    /// Fetch a resource by id, hiding it if the caller may not see it
    ///
    /// For unprivileged callers every stateful ancestor must be visible
    /// too, so an `IN_REVIEW` crag hides everything beneath it.
    pub async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        let Some(resource) = self.store.get(kind, id).await? else {
            return Ok(None);
        };
        if self.is_visible(&resource).await? {
            Ok(Some(resource))
        } else {
            Ok(None)
        }
    }

    /// Whether an already fetched resource, and every stateful ancestor of
    /// it, may be seen by the caller
    pub async fn is_visible(&self, resource: &Resource) -> Result<bool, StoreError> {
        if !VisibilityFilter::admits(self.caller, resource) {
            trace!(kind = %resource.kind(), id = %resource.id(), "Hidden from caller");
            return Ok(false);
        }
        if self.caller.is_privileged() || !resource.kind().has_stateful_ancestor() {
            return Ok(true);
        }

        let visible = self.ancestors_visible(resource).await?;
        if !visible {
            trace!(kind = %resource.kind(), id = %resource.id(), "Hidden behind an ancestor");
        }
        Ok(visible)
    }

    async fn ancestors_visible(&self, resource: &Resource) -> Result<bool, StoreError> {
        let mut kind = resource.kind();
        let mut parent_id = resource.parent_id().cloned();

        while kind.has_stateful_ancestor() {
            let (Some(parent_kind), Some(id)) = (kind.parent(), parent_id.take()) else {
                return Ok(false);
            };
            let Some(parent) = self.store.get(parent_kind, &id).await? else {
                return Ok(false);
            };
            if !VisibilityFilter::admits(self.caller, &parent) {
                return Ok(false);
            }
            kind = parent_kind;
            parent_id = parent.parent_id().cloned();
        }
        Ok(true)
    }

    /// Fetch the children of `parent_id` at level `kind`, dropping hidden ones
    ///
    /// The parent itself is assumed to have been checked by the caller.
    pub async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        let mut children = self.store.get_by_parent(kind, parent_id).await?;
        if kind.is_stateful() && !self.caller.is_privileged() {
            children.retain(|child| VisibilityFilter::admits(self.caller, child));
        }
        Ok(children)
    }
}
