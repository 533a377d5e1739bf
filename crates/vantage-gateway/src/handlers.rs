//! REST endpoint handlers for the gateway.
//!
//! REST reads carry no connection identity (authentication lives
//! upstream), so they always serve the redacted public projection:
//! hidden names come back as the placeholder, hidden annotations come
//! back empty, hidden labels are dropped. Sub-objects are only reachable
//! over the WebSocket replication stream, which does know its recipient.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/scenes/{id}/shapes` | Redacted shapes of a scene |
//! | `GET` | `/api/shapes/{id}` | One redacted shape |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use uuid::Uuid;
use vantage_store::ShapeStore;
use vantage_types::{SceneId, Shape, ShapeId};

use crate::error::GatewayError;
use crate::state::AppState;

/// Serve a minimal HTML page showing gateway status.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let connections = state.registry.len();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Vantage Gateway</title></head>
<body>
    <h1>Vantage Gateway</h1>
    <p>open connections: {connections}</p>
    <p>WebSocket endpoint: <code>/ws</code></p>
</body>
</html>"#
    ))
}

/// `GET /api/scenes/{id}/shapes` -- every shape of a scene, redacted.
pub async fn list_scene_shapes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Shape>>, GatewayError> {
    let scene = SceneId::from(id);
    let shapes = state.broadcaster.store().shapes_in_scene(scene).await?;
    Ok(Json(shapes.iter().map(Shape::redacted).collect()))
}

/// `GET /api/shapes/{id}` -- one shape, redacted.
pub async fn get_shape(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shape>, GatewayError> {
    let shape_id = ShapeId::from(id);
    let shape = state
        .broadcaster
        .store()
        .shape(shape_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("shape {shape_id}")))?;
    Ok(Json(shape.redacted()))
}
