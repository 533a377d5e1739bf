//! HTTP + `WebSocket` gateway for the Vantage session server.
//!
//! The gateway owns everything the sync core treats as external: the
//! live connection registry (which doubles as the core's connection
//! directory and outbound transport), the `WebSocket` endpoint clients
//! replicate through, a small redacted REST read surface, and the
//! storage backend selection.
//!
//! # Modules
//!
//! - [`registry`] -- Live connections; directory + transport seams
//! - [`ws`] -- `WebSocket` session loop and request dispatch
//! - [`router`] / [`handlers`] -- Axum routes and REST reads
//! - [`backend`] -- Runtime storage backend selection
//! - [`state`] -- Shared application state
//! - [`config`] -- YAML configuration with env overrides
//! - [`server`] -- Bind/serve lifecycle
//! - [`error`] -- REST error responses

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use backend::Backend;
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use registry::ConnectionRegistry;
pub use state::AppState;
