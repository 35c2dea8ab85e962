//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use belay_core::{
    AreaAttributes, Attributes, ChainLink, CountryAttributes, CragAttributes, PathAttributes,
    PathPointAttributes, PitchAttributes, PointAttributes, RegionAttributes, Resource, ResourceId,
    ResourceKind, ResourceStore, RouteAttributes, StoreError, SubAreaAttributes, Visibility,
    WallAttributes,
};
use belay_storage::InMemoryResourceStore;

// ============================================================================
// Resource builders
// ============================================================================

pub fn build(
    attributes: Attributes,
    id: &str,
    parent: Option<&str>,
    link: Option<ChainLink>,
) -> Resource {
    attributes
        .into_resource(id.into(), parent.map(ResourceId::from), link)
        .unwrap()
}

pub fn link(first: bool, next: Option<&str>) -> Option<ChainLink> {
    Some(ChainLink::new(first, next.map(ResourceId::from)))
}

pub fn crag(id: &str, state: Visibility) -> Resource {
    build(
        Attributes::Crag(CragAttributes {
            name: id.into(),
            description: None,
            location: None,
            state,
        }),
        id,
        Some("sub-area"),
        None,
    )
}

pub fn wall_spec(name: &str) -> Attributes {
    Attributes::Wall(WallAttributes { name: name.into() })
}

pub fn wall(id: &str, crag: &str, first: bool, next: Option<&str>) -> Resource {
    build(wall_spec(id), id, Some(crag), link(first, next))
}

pub fn route(id: &str, wall: &str, first: bool, next: Option<&str>) -> Resource {
    build(
        Attributes::Route(RouteAttributes {
            name: id.into(),
            description: None,
            grade: Some(10),
            grade_modifier: Some("a".into()),
            style: None,
        }),
        id,
        Some(wall),
        link(first, next),
    )
}

pub fn pitch(id: &str, route: &str, first: bool, next: Option<&str>) -> Resource {
    build(
        Attributes::Pitch(PitchAttributes {
            description: None,
            grade: None,
            grade_modifier: None,
            distance: Some(30.0),
        }),
        id,
        Some(route),
        link(first, next),
    )
}

pub fn point_spec(x: f64) -> Attributes {
    Attributes::Point(PointAttributes { x, y: 0.0, z: 0.0 })
}

pub fn path(id: &str, crag: &str) -> Resource {
    build(Attributes::Path(PathAttributes {}), id, Some(crag), None)
}

pub fn path_point(id: &str, path: &str, first: bool, next: Option<&str>) -> Resource {
    build(
        Attributes::PathPoint(PathPointAttributes {
            latitude: 47.8,
            longitude: -121.5,
        }),
        id,
        Some(path),
        link(first, next),
    )
}

/// Country down to a single public crag `index` under sub-area `sub-area`
pub async fn seed_upper_levels(store: &dyn ResourceStore) {
    let upper = [
        build(
            Attributes::Country(CountryAttributes { name: "USA".into() }),
            "usa",
            None,
            None,
        ),
        build(
            Attributes::Region(RegionAttributes { name: "PNW".into() }),
            "pnw",
            Some("usa"),
            None,
        ),
        build(
            Attributes::Area(AreaAttributes {
                name: "Cascades".into(),
                description: None,
            }),
            "cascades",
            Some("pnw"),
            None,
        ),
        build(
            Attributes::SubArea(SubAreaAttributes {
                name: "Skykomish".into(),
                description: None,
            }),
            "sub-area",
            Some("cascades"),
            None,
        ),
    ];
    for resource in upper {
        store.put(resource).await.unwrap();
    }
}

/// A crag with two ordered walls, one path, routes and pitches:
///
/// ```text
/// index (crag)
/// ├── walls: lower → upper
/// │   ├── lower: r1 → r2
/// │   │   └── r1: p1 → p2
/// │   └── upper: (no routes)
/// └── paths: approach
///     └── approach: pp1 → pp2
/// ```
pub async fn seed_crag(store: &dyn ResourceStore, state: Visibility) {
    seed_upper_levels(store).await;
    let resources = [
        crag("index", state),
        wall("upper", "index", false, None),
        wall("lower", "index", true, Some("upper")),
        route("r2", "lower", false, None),
        route("r1", "lower", true, Some("r2")),
        pitch("p2", "r1", false, None),
        pitch("p1", "r1", true, Some("p2")),
        path("approach", "index"),
        path_point("pp2", "approach", false, None),
        path_point("pp1", "approach", true, Some("pp2")),
    ];
    for resource in resources {
        store.put(resource).await.unwrap();
    }
}

pub fn memory_store() -> Arc<InMemoryResourceStore> {
    Arc::new(InMemoryResourceStore::new())
}

// ============================================================================
// Store doubles
// ============================================================================

/// Counts parent-index lookups on the way through to an inner store
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryResourceStore,
    pub by_parent_calls: AtomicUsize,
}

impl CountingStore {
    pub fn by_parent_calls(&self) -> usize {
        self.by_parent_calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.by_parent_calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResourceStore for CountingStore {
    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        self.inner.get(kind, id).await
    }

    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        self.by_parent_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_parent(kind, parent_id).await
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        self.inner.put(resource).await
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError> {
        self.inner.delete(kind, id).await
    }
}

/// Fails selected operations on the way through to an inner store
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryResourceStore,
    /// Number of puts that succeed before every further put fails
    pub puts_before_failure: Option<usize>,
    /// Child level whose parent lookups fail
    pub failing_level: Option<ResourceKind>,
    puts: AtomicUsize,
}

impl FailingStore {
    pub fn failing_puts_after(count: usize) -> Self {
        Self {
            puts_before_failure: Some(count),
            ..Self::default()
        }
    }

    pub fn failing_level(kind: ResourceKind) -> Self {
        Self {
            failing_level: Some(kind),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResourceStore for FailingStore {
    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Option<Resource>, StoreError> {
        self.inner.get(kind, id).await
    }

    async fn get_by_parent(
        &self,
        kind: ResourceKind,
        parent_id: &ResourceId,
    ) -> Result<Vec<Resource>, StoreError> {
        if self.failing_level == Some(kind) {
            return Err(StoreError::backend(format!("{kind} index unavailable")));
        }
        self.inner.get_by_parent(kind, parent_id).await
    }

    async fn put(&self, resource: Resource) -> Result<(), StoreError> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst);
        if self.puts_before_failure.is_some_and(|limit| n >= limit) {
            return Err(StoreError::backend("write throttled"));
        }
        self.inner.put(resource).await
    }

    async fn delete(&self, kind: ResourceKind, id: &ResourceId) -> Result<(), StoreError> {
        self.inner.delete(kind, id).await
    }
}

pub fn ids(resources: &[Resource]) -> Vec<&str> {
    resources.iter().map(|r| r.id().as_str()).collect()
}

pub fn point_specs(count: usize) -> Vec<Attributes> {
    (0..count).map(|i| point_spec(i as f64)).collect()
}
