//! Shared application state for the gateway.
//!
//! [`AppState`] wires the registry to the sync core: the registry serves
//! as both the connection directory and the outbound transport, so one
//! [`Broadcaster`] instance handles every mutation from every
//! connection. Wrapped in [`Arc`](std::sync::Arc) and injected via
//! Axum's `State` extractor.

use vantage_sync::Broadcaster;
use vantage_store::MemoryStore;

use crate::backend::Backend;
use crate::registry::ConnectionRegistry;

/// Shared state for the Axum application.
pub struct AppState {
    /// The live connection registry (directory + transport).
    pub registry: ConnectionRegistry,
    /// The mutation engine.
    pub broadcaster: Broadcaster<Backend, ConnectionRegistry, ConnectionRegistry>,
}

impl AppState {
    /// Assemble the state around a chosen storage backend.
    pub fn new(backend: Backend) -> Self {
        let registry = ConnectionRegistry::new();
        let broadcaster = Broadcaster::new(backend, registry.clone(), registry.clone());
        Self {
            registry,
            broadcaster,
        }
    }

    /// State over a fresh in-memory backend (tests, default deploys).
    pub fn in_memory() -> Self {
        Self::new(Backend::Memory(MemoryStore::new()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
