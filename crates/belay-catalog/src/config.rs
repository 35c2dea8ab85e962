//! Configuration for the catalog

use serde::{Deserialize, Serialize};

/// Configuration for a [`Catalog`](crate::Catalog)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Upper bound on child subtrees assembled concurrently under one parent
    pub max_concurrent_fetches: usize,
    /// Delete the already-written part of a batch create when a later write fails
    pub rollback_failed_batches: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 16,
            rollback_failed_batches: false,
        }
    }
}

impl CatalogConfig {
    /// Set the fan-out bound, clamped to at least one
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Enable or disable compensating deletes for failed batch creates
    pub fn with_rollback_failed_batches(mut self, enabled: bool) -> Self {
        self.rollback_failed_batches = enabled;
        self
    }

    pub(crate) fn fetch_limit(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }
}
