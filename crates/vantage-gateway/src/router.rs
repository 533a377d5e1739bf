//! Axum router construction for the gateway.
//!
//! Assembles the REST routes and the `WebSocket` endpoint into a single
//! [`Router`] with CORS and request tracing enabled for cross-origin
//! client access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` replication stream
/// - `GET /api/scenes/{id}/shapes` -- redacted scene listing
/// - `GET /api/shapes/{id}` -- single redacted shape
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_session))
        // REST API
        .route("/api/scenes/{id}/shapes", get(handlers::list_scene_shapes))
        .route("/api/shapes/{id}", get(handlers::get_shape))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
