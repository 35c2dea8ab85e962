//! Depth-bounded subtree assembly
//!
//! One generic recursive routine walks the hierarchy using the static level
//! schema: for each child level of a resource it fetches the visible
//! children, orders them if the level is orderable, and recurses while
//! depth remains. Sibling child levels and the per-child recursion are
//! fetched concurrently; any failure aborts the whole assembly.

use std::collections::BTreeMap;
use std::sync::Arc;

use belay_core::{Caller, Resource, ResourceId, ResourceKind, ResourceStore};
use futures::future::{BoxFuture, FutureExt, try_join_all};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::ordering::order_resources;
use crate::visibility::VisibleStore;

/// Children attached under one child level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildSet {
    /// Siblings of an orderable level, head to tail
    Chain(Vec<Subtree>),
    /// Siblings of an unordered level, sorted by id
    Set(Vec<Subtree>),
}

impl ChildSet {
    pub fn members(&self) -> &[Subtree] {
        match self {
            ChildSet::Chain(members) | ChildSet::Set(members) => members,
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, ChildSet::Chain(_))
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Ids of the attached children in their attached order
    pub fn ids(&self) -> Vec<&ResourceId> {
        self.members().iter().map(|s| s.resource.id()).collect()
    }
}

/// A resource with its descendants attached, keyed by child level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtree {
    pub resource: Resource,
    pub children: BTreeMap<ResourceKind, ChildSet>,
}

impl Subtree {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            children: BTreeMap::new(),
        }
    }

    /// Attach a child set at the slot for `kind`
    ///
    /// Fails if `kind` is not one of this resource's child levels.
    pub fn attach(&mut self, kind: ResourceKind, children: ChildSet) -> Result<(), CatalogError> {
        let parent = self.resource.kind();
        if !parent.has_child(kind) {
            return Err(CatalogError::InvalidChild {
                parent,
                child: kind,
            });
        }
        self.children.insert(kind, children);
        Ok(())
    }

    pub fn children(&self, kind: ResourceKind) -> Option<&ChildSet> {
        self.children.get(&kind)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Deepest attached level below this node, zero for a bare resource
    pub fn depth(&self) -> u32 {
        self.children
            .values()
            .flat_map(|set| set.members())
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Builds [`Subtree`]s from a resource store
#[derive(Clone)]
pub struct SubtreeAssembler {
    store: Arc<dyn ResourceStore>,
    config: CatalogConfig,
}

impl SubtreeAssembler {
    pub fn new(store: Arc<dyn ResourceStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    /// Fetch `id` and attach its descendants down to `depth` levels
    ///
    /// `depth == 0` returns the resource alone without any child fetch.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn get_subtree(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        caller: &Caller,
        depth: u32,
    ) -> Result<Subtree, CatalogError> {
        let view = VisibleStore::new(self.store.as_ref(), caller);
        let resource = view
            .get(kind, id)
            .await?
            .ok_or_else(|| CatalogError::not_found(kind, id))?;

        let subtree = self.assemble(&view, resource, depth).await?;
        debug!(levels = subtree.depth(), "Assembled subtree");
        Ok(subtree)
    }

    /// Attach descendants to an already fetched resource
    ///
    /// The resource passes through the same visibility check as a fetch by
    /// id, so a hidden resource is reported as not found.
    pub async fn expand(
        &self,
        resource: Resource,
        caller: &Caller,
        depth: u32,
    ) -> Result<Subtree, CatalogError> {
        let view = VisibleStore::new(self.store.as_ref(), caller);
        if !view.is_visible(&resource).await? {
            return Err(CatalogError::not_found(resource.kind(), resource.id()));
        }
        self.assemble(&view, resource, depth).await
    }

    fn assemble<'a>(
        &'a self,
        view: &'a VisibleStore<'a>,
        resource: Resource,
        depth: u32,
    ) -> BoxFuture<'a, Result<Subtree, CatalogError>> {
        async move {
            let mut subtree = Subtree::new(resource);
            let child_kinds = subtree.resource.child_kinds();
            if depth == 0 || child_kinds.is_empty() {
                return Ok(subtree);
            }

            let parent_id = subtree.resource.id().clone();
            let levels = try_join_all(
                child_kinds
                    .iter()
                    .map(|&kind| self.fetch_level(view, kind, &parent_id, depth)),
            )
            .await?;

            for (kind, children) in levels.into_iter().flatten() {
                subtree.attach(kind, children)?;
            }
            Ok(subtree)
        }
        .boxed()
    }

    /// Fetch one child level; `None` when it has no visible children
    async fn fetch_level(
        &self,
        view: &VisibleStore<'_>,
        kind: ResourceKind,
        parent_id: &ResourceId,
        depth: u32,
    ) -> Result<Option<(ResourceKind, ChildSet)>, CatalogError> {
        let mut children = view.get_by_parent(kind, parent_id).await?;
        if children.is_empty() {
            return Ok(None);
        }

        if kind.is_orderable() {
            children = order_resources(parent_id, children)?;
        } else {
            children.sort_by(|a, b| a.id().cmp(b.id()));
        }
        debug!(parent = %parent_id, kind = %kind, count = children.len(), "Fetched child level");

        let members: Vec<Subtree> = if depth >= 2 {
            stream::iter(children)
                .map(|child| self.assemble(view, child, depth - 1))
                .buffered(self.config.fetch_limit())
                .try_collect()
                .await?
        } else {
            children.into_iter().map(Subtree::new).collect()
        };

        let set = if kind.is_orderable() {
            ChildSet::Chain(members)
        } else {
            ChildSet::Set(members)
        };
        Ok(Some((kind, set)))
    }
}
