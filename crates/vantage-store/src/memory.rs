//! In-memory [`ShapeStore`] backend.
//!
//! The default backend for tests and for gateway deployments without a
//! configured database. All records live in `HashMap`s behind one
//! [`RwLock`]; each store call takes the lock once, so single-record
//! atomicity and last-write-wins come for free.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use vantage_types::{Aura, AuraId, SceneId, Shape, ShapeId, Tracker, TrackerId};

use crate::error::StoreError;
use crate::store::ShapeStore;

/// Shared in-memory storage. Cloning is cheap and clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    shapes: HashMap<ShapeId, Shape>,
    trackers: HashMap<TrackerId, Tracker>,
    auras: HashMap<AuraId, Aura>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored shapes (test helper).
    pub async fn shape_count(&self) -> usize {
        self.inner.read().await.shapes.len()
    }
}

impl ShapeStore for MemoryStore {
    async fn shape(&self, id: ShapeId) -> Result<Option<Shape>, StoreError> {
        Ok(self.inner.read().await.shapes.get(&id).cloned())
    }

    async fn save_shape(&self, shape: &Shape) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .shapes
            .insert(shape.id, shape.clone());
        Ok(())
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let existed = inner.shapes.remove(&id).is_some();
        if existed {
            // Sub-objects are owned by exactly one shape; cascade.
            inner.trackers.retain(|_, tracker| tracker.shape != id);
            inner.auras.retain(|_, aura| aura.shape != id);
        }
        Ok(existed)
    }

    async fn shapes_in_scene(&self, scene: SceneId) -> Result<Vec<Shape>, StoreError> {
        let inner = self.inner.read().await;
        let mut shapes: Vec<Shape> = inner
            .shapes
            .values()
            .filter(|shape| shape.scene == scene)
            .cloned()
            .collect();
        // Deterministic listing order for consumers and tests.
        shapes.sort_by_key(|shape| shape.id);
        Ok(shapes)
    }

    async fn tracker(&self, id: TrackerId) -> Result<Option<Tracker>, StoreError> {
        Ok(self.inner.read().await.trackers.get(&id).cloned())
    }

    async fn save_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .trackers
            .insert(tracker.id, tracker.clone());
        Ok(())
    }

    async fn delete_tracker(&self, id: TrackerId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.trackers.remove(&id).is_some())
    }

    async fn aura(&self, id: AuraId) -> Result<Option<Aura>, StoreError> {
        Ok(self.inner.read().await.auras.get(&id).cloned())
    }

    async fn save_aura(&self, aura: &Aura) -> Result<(), StoreError> {
        self.inner.write().await.auras.insert(aura.id, aura.clone());
        Ok(())
    }

    async fn delete_aura(&self, id: AuraId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.auras.remove(&id).is_some())
    }
}
