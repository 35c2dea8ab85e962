//! # Belay Catalog
//!
//! Ordering, subtree assembly and chain mutation over a
//! [`ResourceStore`](belay_core::ResourceStore).
//!
//! ## Components
//!
//! - [`reconstruct_order`]: rebuilds a sibling chain from `first`/`next`
//! - [`VisibilityFilter`] / [`VisibleStore`]: hides `IN_REVIEW` resources
//!   from unprivileged callers at every fetch
//! - [`SubtreeAssembler`]: depth-bounded, concurrent subtree fetch
//! - [`ChainMutator`]: batch create and validate-then-delete of chains
//! - [`ResourceService`]: single-resource get/list/create/update/delete
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use belay_catalog::{Catalog, CatalogConfig};
//! use belay_core::{Caller, ResourceKind};
//! use belay_storage::InMemoryResourceStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = Catalog::new(Arc::new(InMemoryResourceStore::new()), CatalogConfig::default());
//!     let tree = catalog
//!         .subtrees()
//!         .get_subtree(ResourceKind::Crag, &"index".into(), &Caller::Anonymous, 2)
//!         .await;
//! }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod id;
pub mod ordering;
pub mod service;
pub mod subtree;
pub mod visibility;

pub use chain::ChainMutator;
pub use config::CatalogConfig;
pub use error::{CatalogError, ErrorClass, InvalidOrdering};
pub use id::{ResourceIdGenerator, slugify};
pub use ordering::{Linked, order_resources, reconstruct_order};
pub use service::ResourceService;
pub use subtree::{ChildSet, Subtree, SubtreeAssembler};
pub use visibility::{VisibilityFilter, VisibleStore};

use std::sync::Arc;

use belay_core::ResourceStore;

/// Every catalog component wired to one store and one configuration
#[derive(Clone)]
pub struct Catalog {
    config: CatalogConfig,
    resources: ResourceService,
    subtrees: SubtreeAssembler,
    chains: ChainMutator,
}

impl Catalog {
    pub fn new(store: Arc<dyn ResourceStore>, config: CatalogConfig) -> Self {
        Self {
            resources: ResourceService::new(Arc::clone(&store)),
            subtrees: SubtreeAssembler::new(Arc::clone(&store), config.clone()),
            chains: ChainMutator::new(store, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResourceService {
        &self.resources
    }

    pub fn subtrees(&self) -> &SubtreeAssembler {
        &self.subtrees
    }

    pub fn chains(&self) -> &ChainMutator {
        &self.chains
    }
}
