//! Data layer for the Vantage session server.
//!
//! Defines the [`ShapeStore`] persistence seam the sync core writes
//! through, plus two backends: an in-memory store for tests and
//! database-less deployments, and a `PostgreSQL` store using [`sqlx`]
//! with runtime queries and embedded migrations.
//!
//! # Modules
//!
//! - [`store`] -- The `ShapeStore` trait
//! - [`memory`] -- In-memory backend
//! - [`postgres`] -- `PostgreSQL` pool configuration and lifecycle
//! - [`pg_store`] -- `PostgreSQL` backend
//! - [`error`] -- `StoreError`

pub mod error;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pg_store::PgShapeStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::ShapeStore;
