//! Runtime-selected storage backend.
//!
//! The gateway picks its [`ShapeStore`] at startup: `PostgreSQL` when a
//! database URL is configured, the in-memory store otherwise. [`Backend`]
//! dispatches each store call to whichever backend was selected, keeping
//! the broadcaster's generics monomorphic.

use vantage_store::{MemoryStore, PgShapeStore, ShapeStore, StoreError};
use vantage_types::{Aura, AuraId, SceneId, Shape, ShapeId, Tracker, TrackerId};

/// The storage backend chosen at startup.
#[derive(Clone)]
pub enum Backend {
    /// Volatile in-memory storage (default).
    Memory(MemoryStore),
    /// Durable `PostgreSQL` storage.
    Postgres(PgShapeStore),
}

impl ShapeStore for Backend {
    async fn shape(&self, id: ShapeId) -> Result<Option<Shape>, StoreError> {
        match self {
            Self::Memory(store) => store.shape(id).await,
            Self::Postgres(store) => store.shape(id).await,
        }
    }

    async fn save_shape(&self, shape: &Shape) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save_shape(shape).await,
            Self::Postgres(store) => store.save_shape(shape).await,
        }
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete_shape(id).await,
            Self::Postgres(store) => store.delete_shape(id).await,
        }
    }

    async fn shapes_in_scene(&self, scene: SceneId) -> Result<Vec<Shape>, StoreError> {
        match self {
            Self::Memory(store) => store.shapes_in_scene(scene).await,
            Self::Postgres(store) => store.shapes_in_scene(scene).await,
        }
    }

    async fn tracker(&self, id: TrackerId) -> Result<Option<Tracker>, StoreError> {
        match self {
            Self::Memory(store) => store.tracker(id).await,
            Self::Postgres(store) => store.tracker(id).await,
        }
    }

    async fn save_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save_tracker(tracker).await,
            Self::Postgres(store) => store.save_tracker(tracker).await,
        }
    }

    async fn delete_tracker(&self, id: TrackerId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete_tracker(id).await,
            Self::Postgres(store) => store.delete_tracker(id).await,
        }
    }

    async fn aura(&self, id: AuraId) -> Result<Option<Aura>, StoreError> {
        match self {
            Self::Memory(store) => store.aura(id).await,
            Self::Postgres(store) => store.aura(id).await,
        }
    }

    async fn save_aura(&self, aura: &Aura) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save_aura(aura).await,
            Self::Postgres(store) => store.save_aura(aura).await,
        }
    }

    async fn delete_aura(&self, id: AuraId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete_aura(id).await,
            Self::Postgres(store) => store.delete_aura(id).await,
        }
    }
}
