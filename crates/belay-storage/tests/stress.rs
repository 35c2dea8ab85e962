//! Stress tests for belay-storage
//!
//! These tests drive both adapters through the same contract under
//! concurrent access and larger sibling sets.

use std::sync::Arc;
use std::time::Instant;

use belay_core::{
    Attributes, ChainLink, PointAttributes, Resource, ResourceId, ResourceKind, ResourceStore,
};
use belay_storage::{InMemoryResourceStore, RedbResourceStore, RedbStoreConfig};
use tempfile::TempDir;

fn point(id: usize, pitch: &str) -> Resource {
    Attributes::Point(PointAttributes {
        x: id as f64,
        y: 0.0,
        z: 0.0,
    })
    .into_resource(
        ResourceId::new(format!("{pitch}-point-{id}")),
        Some(pitch.into()),
        Some(ChainLink::new(id == 0, None)),
    )
    .unwrap()
}

async fn exercise_contract(store: Arc<dyn ResourceStore>) {
    let pitches = ["p1", "p2", "p3", "p4"];
    let per_pitch = 250;

    let start = Instant::now();

    let handles: Vec<_> = pitches
        .iter()
        .map(|pitch| {
            let store = Arc::clone(&store);
            let pitch = pitch.to_string();
            tokio::spawn(async move {
                for i in 0..per_pitch {
                    store
                        .put(point(i, &pitch))
                        .await
                        .expect("Failed to store point");
                }
            })
        })
        .collect();
    futures::future::try_join_all(handles).await.unwrap();

    println!(
        "Stored {} points in {:?}",
        pitches.len() * per_pitch,
        start.elapsed()
    );

    for pitch in pitches {
        let points = store
            .get_by_parent(ResourceKind::Point, &pitch.into())
            .await
            .unwrap();
        assert_eq!(points.len(), per_pitch);
        assert!(
            points
                .iter()
                .all(|p| p.parent_id().map(ResourceId::as_str) == Some(pitch))
        );
    }

    // Delete half of one sibling set
    for i in (0..per_pitch).step_by(2) {
        let id = ResourceId::new(format!("p1-point-{i}"));
        store.delete(ResourceKind::Point, &id).await.unwrap();
    }
    let remaining = store
        .get_by_parent(ResourceKind::Point, &"p1".into())
        .await
        .unwrap();
    assert_eq!(remaining.len(), per_pitch / 2);
}

// ============================================================================
// Concurrent access
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_concurrent_writers() {
    exercise_contract(Arc::new(InMemoryResourceStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_redb_store_concurrent_writers() {
    let dir = TempDir::new().unwrap();
    let config = RedbStoreConfig::default().with_path(dir.path().join("stress.redb"));
    let store = RedbResourceStore::open(config).unwrap();
    exercise_contract(Arc::new(store)).await;
}
