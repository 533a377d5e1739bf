//! Gateway binary for the Vantage session server.
//!
//! Wires the storage backend, connection registry, and sync core
//! together and serves the HTTP + `WebSocket` API.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `vantage.yaml` (env overrides applied)
//! 3. Select the storage backend (`PostgreSQL` when configured, else
//!    in-memory) and run migrations
//! 4. Assemble the shared application state
//! 5. Serve until terminated

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vantage_gateway::backend::Backend;
use vantage_gateway::config::GatewayConfig;
use vantage_gateway::server::start_server;
use vantage_gateway::state::AppState;
use vantage_store::{MemoryStore, PgShapeStore, PostgresPool};

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "vantage.yaml";

/// Application entry point for the gateway.
///
/// # Errors
///
/// Returns an error if any initialization step or the server itself
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("vantage-gateway starting");

    // 2. Load configuration.
    let config = GatewayConfig::load(Path::new(CONFIG_PATH))?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        database = config.database.url.is_some(),
        "Configuration loaded"
    );

    // 3. Select the storage backend.
    let backend = match &config.database.url {
        Some(url) => {
            let pool = PostgresPool::connect_url(url).await?;
            pool.run_migrations().await?;
            Backend::Postgres(PgShapeStore::new(&pool))
        }
        None => {
            info!("No database configured; using the in-memory store");
            Backend::Memory(MemoryStore::new())
        }
    };

    // 4. Assemble shared state.
    let state = Arc::new(AppState::new(backend));

    // 5. Serve.
    start_server(&config.server, state).await?;

    Ok(())
}
