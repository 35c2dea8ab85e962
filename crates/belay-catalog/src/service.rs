//! Single-resource operations
//!
//! Reads go through the visibility filter. Writes assume an already
//! authorized caller and work on the raw store.

use std::sync::Arc;

use belay_core::{
    Attributes, Caller, ChainLink, ModelError, Resource, ResourceId, ResourceKind, ResourceStore,
};
use tracing::{debug, instrument};

use crate::error::CatalogError;
use crate::id::ResourceIdGenerator;
use crate::ordering::order_resources;
use crate::visibility::VisibleStore;

#[derive(Clone)]
pub struct ResourceService {
    store: Arc<dyn ResourceStore>,
    ids: ResourceIdGenerator,
}

impl ResourceService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            ids: ResourceIdGenerator::new(),
        }
    }

    /// Direct get; hidden resources are reported as not found
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        caller: &Caller,
    ) -> Result<Resource, CatalogError> {
        VisibleStore::new(self.store.as_ref(), caller)
            .get(kind, id)
            .await?
            .ok_or_else(|| CatalogError::not_found(kind, id))
    }

    /// Children of `parent_id` at level `kind`
    ///
    /// With `ordered` set and an orderable level, the children come back as
    /// a reconstructed chain; otherwise they are sorted by id.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn list_children(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
        caller: &Caller,
        ordered: bool,
    ) -> Result<Vec<Resource>, CatalogError> {
        let parent_kind = kind.parent().ok_or(ModelError::UnexpectedParent { kind })?;
        let view = VisibleStore::new(self.store.as_ref(), caller);

        if view.get(parent_kind, parent_id).await?.is_none() {
            return Err(CatalogError::parent_not_found(parent_kind, parent_id));
        }

        let mut children = view.get_by_parent(kind, parent_id).await?;
        if ordered && kind.is_orderable() {
            children = order_resources(parent_id, children)?;
        } else {
            children.sort_by(|a, b| a.id().cmp(b.id()));
        }
        Ok(children)
    }

    /// Create one resource with a generated id
    ///
    /// The link is stored as given; a broken chain only shows up when the
    /// siblings are next read in order.
    #[instrument(skip(self, attributes, link), fields(kind = %attributes.kind()))]
    pub async fn create(
        &self,
        parent_id: Option<&ResourceId>,
        attributes: Attributes,
        link: Option<ChainLink>,
    ) -> Result<Resource, CatalogError> {
        let kind = attributes.kind();
        if let (Some(parent_kind), Some(parent_id)) = (kind.parent(), parent_id)
            && self.store.get(parent_kind, parent_id).await?.is_none()
        {
            return Err(CatalogError::parent_not_found(parent_kind, parent_id));
        }

        let id = self.ids.generate(&attributes.id_prefix(parent_id));
        let resource = attributes.into_resource(id, parent_id.cloned(), link)?;
        self.store.put(resource.clone()).await?;

        debug!(id = %resource.id(), "Created resource");
        Ok(resource)
    }

    /// Replace a stored resource wholesale
    #[instrument(skip(self, resource), fields(kind = %resource.kind(), id = %resource.id()))]
    pub async fn update(&self, resource: Resource) -> Result<(), CatalogError> {
        let kind = resource.kind();
        if self.store.get(kind, resource.id()).await?.is_none() {
            return Err(CatalogError::not_found(kind, resource.id()));
        }
        if let (Some(parent_kind), Some(parent_id)) = (kind.parent(), resource.parent_id())
            && self.store.get(parent_kind, parent_id).await?.is_none()
        {
            return Err(CatalogError::parent_not_found(parent_kind, parent_id));
        }

        self.store.put(resource).await?;
        Ok(())
    }

    /// Delete one resource; refuses while it still has children
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), CatalogError> {
        if self.store.get(kind, id).await?.is_none() {
            return Err(CatalogError::not_found(kind, id));
        }
        for &child in kind.children() {
            if !self.store.get_by_parent(child, id).await?.is_empty() {
                return Err(CatalogError::NotEmpty {
                    kind,
                    id: id.clone(),
                    child,
                });
            }
        }

        self.store.delete(kind, id).await?;
        debug!("Deleted resource");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use belay_core::{CountryAttributes, RegionAttributes};
    use belay_storage::InMemoryResourceStore;

    fn service() -> ResourceService {
        ResourceService::new(Arc::new(InMemoryResourceStore::new()))
    }

    #[tokio::test]
    async fn test_create_root_and_child() {
        let service = service();
        let country = service
            .create(
                None,
                Attributes::Country(CountryAttributes { name: "USA".into() }),
                None,
            )
            .await
            .unwrap();
        assert!(country.id().as_str().starts_with("usa-"));

        let region = service
            .create(
                Some(country.id()),
                Attributes::Region(RegionAttributes {
                    name: "Pacific Northwest".into(),
                }),
                None,
            )
            .await
            .unwrap();
        assert_eq!(region.parent_id(), Some(country.id()));
        assert!(region.id().as_str().starts_with("pacific-northwest-"));
    }

    #[tokio::test]
    async fn test_create_requires_parent() {
        let err = service()
            .create(
                Some(&"nowhere".into()),
                Attributes::Region(RegionAttributes { name: "R".into() }),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ParentNotFound {
                kind: ResourceKind::Country,
                ..
            }
        ));

        let err = service()
            .create(
                None,
                Attributes::Region(RegionAttributes { name: "R".into() }),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Model(ModelError::MissingParent { .. })));
    }

    #[tokio::test]
    async fn test_delete_refuses_non_empty() {
        let service = service();
        let country = service
            .create(
                None,
                Attributes::Country(CountryAttributes { name: "USA".into() }),
                None,
            )
            .await
            .unwrap();
        let region = service
            .create(
                Some(country.id()),
                Attributes::Region(RegionAttributes { name: "West".into() }),
                None,
            )
            .await
            .unwrap();

        let err = service
            .delete(ResourceKind::Country, country.id())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotEmpty {
                child: ResourceKind::Region,
                ..
            }
        ));

        tokio_test::assert_ok!(service.delete(ResourceKind::Region, region.id()).await);
        tokio_test::assert_ok!(service.delete(ResourceKind::Country, country.id()).await);

        let err =
            tokio_test::assert_err!(service.delete(ResourceKind::Country, country.id()).await);
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let service = service();
        let country = service
            .create(
                None,
                Attributes::Country(CountryAttributes { name: "USA".into() }),
                None,
            )
            .await
            .unwrap();

        let renamed = Attributes::Country(CountryAttributes {
            name: "United States".into(),
        })
        .into_resource(country.id().clone(), None, None)
        .unwrap();
        service.update(renamed.clone()).await.unwrap();

        let fetched = service
            .get(ResourceKind::Country, country.id(), &Caller::Anonymous)
            .await
            .unwrap();
        assert_eq!(fetched, renamed);

        let ghost = Attributes::Country(CountryAttributes { name: "X".into() })
            .into_resource("ghost".into(), None, None)
            .unwrap();
        assert!(matches!(
            service.update(ghost).await,
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_children_of_root_level_is_rejected() {
        let err = service()
            .list_children(ResourceKind::Country, &"x".into(), &Caller::Anonymous, false)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Model(_)));
    }
}
