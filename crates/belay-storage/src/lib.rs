//! # Belay Storage
//!
//! Resource store adapters for the Belay catalog.
//!
//! ## Features
//!
//! - **InMemoryResourceStore**: `DashMap`-backed store for tests and scratch use
//! - **RedbResourceStore**: single-file persistent store built on redb
//!
//! Both implement [`belay_core::ResourceStore`] and keep a secondary index
//! on `(kind, parent_id)` so sibling lookups never scan a whole level.
//!
//! ## Example
//!
//! ```rust,ignore
//! use belay_core::{ResourceKind, ResourceStore};
//! use belay_storage::InMemoryResourceStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryResourceStore::new();
//!     let walls = store
//!         .get_by_parent(ResourceKind::Wall, &"index".into())
//!         .await
//!         .unwrap();
//!     assert!(walls.is_empty());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod persistent;

// Re-exports
pub use error::StorageError;
pub use memory::InMemoryResourceStore;
pub use persistent::{RedbResourceStore, RedbStoreConfig};

// Re-export the store trait for convenience
pub use belay_core::ResourceStore;
