//! `PostgreSQL`-backed [`ShapeStore`] implementation.
//!
//! Shapes, trackers, and auras map to one table each. The ownership
//! relation, label attachments, and the ordered option bag are stored as
//! JSONB columns on the shape row -- the option bag in particular must
//! round-trip as an ordered array of `[key, value]` pairs, which JSONB
//! arrays preserve.
//!
//! Uses runtime types rather than compile-time checked queries to avoid
//! requiring a live database during builds.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vantage_types::{Aura, AuraId, SceneId, Shape, ShapeId, Tracker, TrackerId};

use crate::error::StoreError;
use crate::postgres::PostgresPool;
use crate::store::ShapeStore;

/// [`ShapeStore`] backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgShapeStore {
    pool: PgPool,
}

impl PgShapeStore {
    /// Create a store over an established pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

impl ShapeStore for PgShapeStore {
    async fn shape(&self, id: ShapeId) -> Result<Option<Shape>, StoreError> {
        let row = sqlx::query_as::<_, ShapeRow>(
            r"SELECT id, scene, layer, name, name_visible, annotation, annotation_visible,
                     stroke_colour, fill_colour, is_locked, is_invisible, is_defeated,
                     is_token, blocks_movement, blocks_vision, is_door, is_teleport_zone,
                     badge, show_badge, options, owners, labels, updated_at
              FROM shapes
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShapeRow::into_shape).transpose()
    }

    async fn save_shape(&self, shape: &Shape) -> Result<(), StoreError> {
        let owners = serde_json::to_value(&shape.owners)?;
        let labels = serde_json::to_value(&shape.labels)?;
        let options = serde_json::to_value(&shape.options)?;

        sqlx::query(
            r"INSERT INTO shapes (
                  id, scene, layer, name, name_visible, annotation, annotation_visible,
                  stroke_colour, fill_colour, is_locked, is_invisible, is_defeated,
                  is_token, blocks_movement, blocks_vision, is_door, is_teleport_zone,
                  badge, show_badge, options, owners, labels
              )
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                      $15, $16, $17, $18, $19, $20, $21, $22)
              ON CONFLICT (id) DO UPDATE SET
                  scene = EXCLUDED.scene,
                  layer = EXCLUDED.layer,
                  name = EXCLUDED.name,
                  name_visible = EXCLUDED.name_visible,
                  annotation = EXCLUDED.annotation,
                  annotation_visible = EXCLUDED.annotation_visible,
                  stroke_colour = EXCLUDED.stroke_colour,
                  fill_colour = EXCLUDED.fill_colour,
                  is_locked = EXCLUDED.is_locked,
                  is_invisible = EXCLUDED.is_invisible,
                  is_defeated = EXCLUDED.is_defeated,
                  is_token = EXCLUDED.is_token,
                  blocks_movement = EXCLUDED.blocks_movement,
                  blocks_vision = EXCLUDED.blocks_vision,
                  is_door = EXCLUDED.is_door,
                  is_teleport_zone = EXCLUDED.is_teleport_zone,
                  badge = EXCLUDED.badge,
                  show_badge = EXCLUDED.show_badge,
                  options = EXCLUDED.options,
                  owners = EXCLUDED.owners,
                  labels = EXCLUDED.labels,
                  updated_at = now()",
        )
        .bind(shape.id.into_inner())
        .bind(shape.scene.into_inner())
        .bind(&shape.layer)
        .bind(&shape.name)
        .bind(shape.name_visible)
        .bind(&shape.annotation)
        .bind(shape.annotation_visible)
        .bind(&shape.stroke_colour)
        .bind(&shape.fill_colour)
        .bind(shape.is_locked)
        .bind(shape.is_invisible)
        .bind(shape.is_defeated)
        .bind(shape.is_token)
        .bind(shape.blocks_movement)
        .bind(shape.blocks_vision)
        .bind(shape.is_door)
        .bind(shape.is_teleport_zone)
        .bind(i64::from(shape.badge))
        .bind(shape.show_badge)
        .bind(options)
        .bind(owners)
        .bind(labels)
        .execute(&self.pool)
        .await?;

        tracing::debug!(shape = %shape.id, "Persisted shape");
        Ok(())
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, StoreError> {
        let result = sqlx::query(r"DELETE FROM shapes WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn shapes_in_scene(&self, scene: SceneId) -> Result<Vec<Shape>, StoreError> {
        let rows = sqlx::query_as::<_, ShapeRow>(
            r"SELECT id, scene, layer, name, name_visible, annotation, annotation_visible,
                     stroke_colour, fill_colour, is_locked, is_invisible, is_defeated,
                     is_token, blocks_movement, blocks_vision, is_door, is_teleport_zone,
                     badge, show_badge, options, owners, labels, updated_at
              FROM shapes
              WHERE scene = $1
              ORDER BY id",
        )
        .bind(scene.into_inner())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ShapeRow::into_shape).collect()
    }

    async fn tracker(&self, id: TrackerId) -> Result<Option<Tracker>, StoreError> {
        let row = sqlx::query_as::<_, TrackerRow>(
            r"SELECT id, shape, visible, name, value, maxvalue, draw,
                     primary_colour, secondary_colour
              FROM trackers
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TrackerRow::into_tracker))
    }

    async fn save_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO trackers (
                  id, shape, visible, name, value, maxvalue, draw,
                  primary_colour, secondary_colour
              )
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              ON CONFLICT (id) DO UPDATE SET
                  shape = EXCLUDED.shape,
                  visible = EXCLUDED.visible,
                  name = EXCLUDED.name,
                  value = EXCLUDED.value,
                  maxvalue = EXCLUDED.maxvalue,
                  draw = EXCLUDED.draw,
                  primary_colour = EXCLUDED.primary_colour,
                  secondary_colour = EXCLUDED.secondary_colour",
        )
        .bind(tracker.id.into_inner())
        .bind(tracker.shape.into_inner())
        .bind(tracker.visible)
        .bind(tracker.name.as_str())
        .bind(tracker.value)
        .bind(tracker.maxvalue)
        .bind(tracker.draw)
        .bind(tracker.primary_colour.as_str())
        .bind(tracker.secondary_colour.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_tracker(&self, id: TrackerId) -> Result<bool, StoreError> {
        let result = sqlx::query(r"DELETE FROM trackers WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn aura(&self, id: AuraId) -> Result<Option<Aura>, StoreError> {
        let row = sqlx::query_as::<_, AuraRow>(
            r"SELECT id, shape, visible, vision_source, name, value, dim, colour
              FROM auras
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuraRow::into_aura))
    }

    async fn save_aura(&self, aura: &Aura) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO auras (
                  id, shape, visible, vision_source, name, value, dim, colour
              )
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
              ON CONFLICT (id) DO UPDATE SET
                  shape = EXCLUDED.shape,
                  visible = EXCLUDED.visible,
                  vision_source = EXCLUDED.vision_source,
                  name = EXCLUDED.name,
                  value = EXCLUDED.value,
                  dim = EXCLUDED.dim,
                  colour = EXCLUDED.colour",
        )
        .bind(aura.id.into_inner())
        .bind(aura.shape.into_inner())
        .bind(aura.visible)
        .bind(aura.vision_source)
        .bind(aura.name.as_str())
        .bind(i64::from(aura.value))
        .bind(i64::from(aura.dim))
        .bind(aura.colour.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_aura(&self, id: AuraId) -> Result<bool, StoreError> {
        let result = sqlx::query(r"DELETE FROM auras WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// A row from the `shapes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ShapeRow {
    id: Uuid,
    scene: Uuid,
    layer: String,
    name: String,
    name_visible: bool,
    annotation: String,
    annotation_visible: bool,
    stroke_colour: String,
    fill_colour: String,
    is_locked: bool,
    is_invisible: bool,
    is_defeated: bool,
    is_token: bool,
    blocks_movement: bool,
    blocks_vision: bool,
    is_door: bool,
    is_teleport_zone: bool,
    badge: i64,
    show_badge: bool,
    options: serde_json::Value,
    owners: serde_json::Value,
    labels: serde_json::Value,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

impl ShapeRow {
    /// Decode the JSONB columns into the domain record.
    fn into_shape(self) -> Result<Shape, StoreError> {
        Ok(Shape {
            id: self.id.into(),
            scene: self.scene.into(),
            layer: self.layer,
            name: self.name,
            name_visible: self.name_visible,
            annotation: self.annotation,
            annotation_visible: self.annotation_visible,
            stroke_colour: self.stroke_colour,
            fill_colour: self.fill_colour,
            is_locked: self.is_locked,
            is_invisible: self.is_invisible,
            is_defeated: self.is_defeated,
            is_token: self.is_token,
            blocks_movement: self.blocks_movement,
            blocks_vision: self.blocks_vision,
            is_door: self.is_door,
            is_teleport_zone: self.is_teleport_zone,
            badge: u32::try_from(self.badge).unwrap_or(0),
            show_badge: self.show_badge,
            options: serde_json::from_value(self.options)?,
            owners: serde_json::from_value(self.owners)?,
            labels: serde_json::from_value(self.labels)?,
        })
    }
}

/// A row from the `trackers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct TrackerRow {
    id: Uuid,
    shape: Uuid,
    visible: bool,
    name: String,
    value: i32,
    maxvalue: i32,
    draw: bool,
    primary_colour: String,
    secondary_colour: String,
}

impl TrackerRow {
    fn into_tracker(self) -> Tracker {
        Tracker {
            id: self.id.into(),
            shape: self.shape.into(),
            visible: self.visible,
            name: self.name,
            value: self.value,
            maxvalue: self.maxvalue,
            draw: self.draw,
            primary_colour: self.primary_colour,
            secondary_colour: self.secondary_colour,
        }
    }
}

/// A row from the `auras` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AuraRow {
    id: Uuid,
    shape: Uuid,
    visible: bool,
    vision_source: bool,
    name: String,
    value: i64,
    dim: i64,
    colour: String,
}

impl AuraRow {
    fn into_aura(self) -> Aura {
        Aura {
            id: self.id.into(),
            shape: self.shape.into(),
            visible: self.visible,
            vision_source: self.vision_source,
            name: self.name,
            value: u32::try_from(self.value).unwrap_or(0),
            dim: u32::try_from(self.dim).unwrap_or(0),
            colour: self.colour,
        }
    }
}
