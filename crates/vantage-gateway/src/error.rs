//! Error types for the gateway's HTTP surface.
//!
//! [`GatewayError`] unifies the REST failure modes into a single enum
//! that converts into an Axum HTTP response. WebSocket mutation failures
//! never surface here: a failed mutation is silent to other connections,
//! and the origin receives no explicit failure acknowledgment at this
//! layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<vantage_store::StoreError> for GatewayError {
    fn from(error: vantage_store::StoreError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
