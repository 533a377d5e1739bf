//! The persistence seam consumed by the sync core.
//!
//! [`ShapeStore`] is the Entity Store interface: the broadcaster persists
//! through it and never learns which backend is behind it. Each method is
//! atomic on the single record it touches; concurrent writers to the same
//! record resolve last-write-wins. Callers needing stronger guarantees
//! add an optimistic-version check above this layer.
//!
//! Methods return `impl Future + Send` so generic callers can be spawned
//! onto the runtime without extra bounds.

use std::future::Future;

use vantage_types::{Aura, AuraId, SceneId, Shape, ShapeId, Tracker, TrackerId};

use crate::error::StoreError;

/// Persistent storage for shapes and their sub-objects.
pub trait ShapeStore: Send + Sync {
    /// Fetch a shape by id. Absent ids yield `Ok(None)`.
    fn shape(
        &self,
        id: ShapeId,
    ) -> impl Future<Output = Result<Option<Shape>, StoreError>> + Send;

    /// Insert or fully replace a shape record.
    fn save_shape(&self, shape: &Shape) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a shape. Returns whether a record existed.
    fn delete_shape(&self, id: ShapeId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// List every shape placed in a scene.
    fn shapes_in_scene(
        &self,
        scene: SceneId,
    ) -> impl Future<Output = Result<Vec<Shape>, StoreError>> + Send;

    /// Fetch a tracker by id. Absent ids yield `Ok(None)`.
    fn tracker(
        &self,
        id: TrackerId,
    ) -> impl Future<Output = Result<Option<Tracker>, StoreError>> + Send;

    /// Insert or fully replace a tracker record.
    fn save_tracker(
        &self,
        tracker: &Tracker,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a tracker. Returns whether a record existed.
    fn delete_tracker(
        &self,
        id: TrackerId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Fetch an aura by id. Absent ids yield `Ok(None)`.
    fn aura(
        &self,
        id: AuraId,
    ) -> impl Future<Output = Result<Option<Aura>, StoreError>> + Send;

    /// Insert or fully replace an aura record.
    fn save_aura(&self, aura: &Aura) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete an aura. Returns whether a record existed.
    fn delete_aura(&self, id: AuraId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
