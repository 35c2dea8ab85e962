//! # Belay Core
//!
//! Core types, traits, and errors for the Belay climbing catalog.
//!
//! The catalog is a fixed-depth tree of resources. This crate describes the
//! tree (levels and their schema), the records that live in it, and the
//! store abstraction every adapter implements.
//!
//! ## Key Traits
//!
//! - [`ResourceStore`]: get/put/delete by id plus lookup by parent id
//! - [`HasOrder`]: siblings linked through `first`/`next`
//! - [`HasVisibility`]: review state gating unprivileged reads
//! - [`HasChildren`]: levels with child levels
//!
//! ## Key Types
//!
//! - [`ResourceKind`] and [`LevelSchema`]: the static hierarchy
//! - [`Resource`]: a record at any level
//! - [`Attributes`]: a creation spec for any level
//! - [`Caller`]: the identity a request runs as

pub mod caller;
pub mod error;
pub mod level;
pub mod model;
pub mod store;

pub use caller::*;
pub use error::*;
pub use level::*;
pub use model::*;
pub use store::*;
