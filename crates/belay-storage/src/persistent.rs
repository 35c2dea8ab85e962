//! redb-backed resource store
//!
//! Two tables: `resources` holds postcard-encoded records keyed by
//! `kind \0 id`, and `parent_index` maps `kind \0 parent_id \0 id` to the
//! child id so that a prefix scan yields one sibling set.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use belay_core::{Resource, ResourceId, ResourceKind, ResourceStore, StoreError};
use redb::{Database, TableDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::error::StorageError;

// Key: kind \0 id, Value: serialized Resource
pub const RESOURCES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("resources");

// Key: kind \0 parent_id \0 id, Value: id bytes
pub const PARENT_INDEX: TableDefinition<&[u8], &[u8]> = TableDefinition::new("parent_index");

const SEPARATOR: u8 = 0;

/// Configuration for the redb store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedbStoreConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// Cache size in bytes
    pub cache_size: usize,
}

impl Default for RedbStoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/belay.redb"),
            cache_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl RedbStoreConfig {
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }
}

fn resource_key(kind: ResourceKind, id: &ResourceId) -> Vec<u8> {
    let mut key = Vec::with_capacity(kind.as_str().len() + id.as_str().len() + 1);
    key.extend_from_slice(kind.as_str().as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

fn parent_prefix(kind: ResourceKind, parent_id: &ResourceId) -> Vec<u8> {
    let mut key = resource_key(kind, parent_id);
    key.push(SEPARATOR);
    key
}

fn index_key(kind: ResourceKind, parent_id: &ResourceId, id: &ResourceId) -> Vec<u8> {
    let mut key = parent_prefix(kind, parent_id);
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// Persistent implementation of ResourceStore on a single redb file
pub struct RedbResourceStore {
    db: Arc<Database>,
    config: RedbStoreConfig,
}

impl RedbResourceStore {
    /// Open or create the database
    #[instrument(skip(config), fields(path = %config.db_path.display()))]
    pub fn open(config: RedbStoreConfig) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&config.db_path)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        info!("Opened redb database");

        let store = Self {
            db: Arc::new(db),
            config,
        };
        store.init_tables()?;

        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(db_err)?;
        write_txn.open_table(RESOURCES).map_err(db_err)?;
        write_txn.open_table(PARENT_INDEX).map_err(db_err)?;
        write_txn.commit().map_err(db_err)?;

        debug!("Initialized redb tables");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &RedbStoreConfig {
        &self.config
    }

    fn get_sync(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(RESOURCES).map_err(db_err)?;

        match table.get(resource_key(kind, id).as_slice()).map_err(db_err)? {
            Some(bytes) => Ok(Some(postcard::from_bytes(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn get_by_parent_sync(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StorageError> {
        let prefix = parent_prefix(kind, parent_id);

        let read_txn = self.db.begin_read().map_err(db_err)?;
        let index = read_txn.open_table(PARENT_INDEX).map_err(db_err)?;
        let resources = read_txn.open_table(RESOURCES).map_err(db_err)?;

        let mut results = Vec::new();
        for entry in index.range(prefix.as_slice()..).map_err(db_err)? {
            let (key, value) = entry.map_err(db_err)?;

            // Stop when we're past the prefix
            if !key.value().starts_with(&prefix) {
                break;
            }

            let id = String::from_utf8(value.value().to_vec())
                .map_err(|e| StorageError::deserialization(e.to_string()))?;
            let record_key = resource_key(kind, &ResourceId::from(id));
            if let Some(bytes) = resources.get(record_key.as_slice()).map_err(db_err)? {
                results.push(postcard::from_bytes(bytes.value())?);
            }
        }

        Ok(results)
    }

    fn put_sync(&self, resource: &Resource) -> Result<(), StorageError> {
        let kind = resource.kind();
        let id = resource.id();
        let key = resource_key(kind, id);
        let bytes = postcard::to_allocvec(resource)
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut resources = write_txn.open_table(RESOURCES).map_err(db_err)?;
            let mut index = write_txn.open_table(PARENT_INDEX).map_err(db_err)?;

            let previous: Option<Resource> = match resources
                .insert(key.as_slice(), bytes.as_slice())
                .map_err(db_err)?
            {
                Some(old) => Some(postcard::from_bytes(old.value())?),
                None => None,
            };

            if let Some(old_parent) = previous.as_ref().and_then(Resource::parent_id)
                && Some(old_parent) != resource.parent_id()
            {
                index
                    .remove(index_key(kind, old_parent, id).as_slice())
                    .map_err(db_err)?;
            }

            if let Some(parent_id) = resource.parent_id() {
                index
                    .insert(
                        index_key(kind, parent_id, id).as_slice(),
                        id.as_str().as_bytes(),
                    )
                    .map_err(db_err)?;
            }
        }
        write_txn.commit().map_err(db_err)?;

        Ok(())
    }

    fn delete_sync(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut resources = write_txn.open_table(RESOURCES).map_err(db_err)?;
            let mut index = write_txn.open_table(PARENT_INDEX).map_err(db_err)?;

            let removed: Option<Resource> = match resources
                .remove(resource_key(kind, id).as_slice())
                .map_err(db_err)?
            {
                Some(old) => Some(postcard::from_bytes(old.value())?),
                None => None,
            };

            if let Some(parent_id) = removed.as_ref().and_then(Resource::parent_id) {
                index
                    .remove(index_key(kind, parent_id, id).as_slice())
                    .map_err(db_err)?;
            }
        }
        write_txn.commit().map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl ResourceStore for RedbResourceStore {
    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        Ok(self.get_sync(kind, id)?)
    }

    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        Ok(self.get_by_parent_sync(kind, parent_id)?)
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        trace!(kind = %resource.kind(), id = %resource.id(), "Storing resource");
        Ok(self.put_sync(&resource)?)
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError> {
        trace!(kind = %kind, id = %id, "Deleting resource");
        Ok(self.delete_sync(kind, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use belay_core::{Attributes, ChainLink, CragAttributes, Visibility, WallAttributes};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> RedbResourceStore {
        let config = RedbStoreConfig::default().with_path(dir.path().join("test.redb"));
        RedbResourceStore::open(config).unwrap()
    }

    fn wall(id: &str, crag: &str, first: bool, next: Option<&str>) -> Resource {
        Attributes::Wall(WallAttributes { name: id.into() })
            .into_resource(
                id.into(),
                Some(crag.into()),
                Some(ChainLink::new(first, next.map(ResourceId::from))),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let resource = wall("w1", "crag", true, Some("w2"));
        store.put(resource.clone()).await.unwrap();

        let fetched = store
            .get(ResourceKind::Wall, &"w1".into())
            .await
            .unwrap();
        assert_eq!(fetched, Some(resource));
        assert!(
            store
                .get(ResourceKind::Route, &"w1".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_parent_scan_does_not_bleed_into_longer_ids() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.put(wall("w1", "crag", true, None)).await.unwrap();
        store.put(wall("w2", "crag-2", true, None)).await.unwrap();

        let children = store
            .get_by_parent(ResourceKind::Wall, &"crag".into())
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id().as_str(), "w1");
    }

    #[tokio::test]
    async fn test_overwrite_and_delete_keep_index_in_sync() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        store.put(wall("w1", "a", true, None)).await.unwrap();
        store.put(wall("w1", "b", true, None)).await.unwrap();
        assert!(
            store
                .get_by_parent(ResourceKind::Wall, &"a".into())
                .await
                .unwrap()
                .is_empty()
        );

        store
            .delete(ResourceKind::Wall, &"w1".into())
            .await
            .unwrap();
        assert!(
            store
                .get_by_parent(ResourceKind::Wall, &"b".into())
                .await
                .unwrap()
                .is_empty()
        );

        // Absent ids are fine
        store
            .delete(ResourceKind::Wall, &"w1".into())
            .await
            .unwrap();
    }

    #[test]
    fn test_reopen_persists() {
        let dir = TempDir::new().unwrap();
        let crag = Attributes::Crag(CragAttributes {
            name: "Index".into(),
            description: Some("Town walls".into()),
            location: None,
            state: Visibility::Public,
        })
        .into_resource("index".into(), Some("sub".into()), None)
        .unwrap();

        {
            let store = open(&dir);
            tokio_test::block_on(store.put(crag.clone())).unwrap();
        }

        let store = open(&dir);
        let fetched = tokio_test::block_on(store.get(ResourceKind::Crag, &"index".into()));
        assert_eq!(tokio_test::assert_ok!(fetched), Some(crag));
    }
}
