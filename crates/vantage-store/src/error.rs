//! Error types for the data layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the
//! underlying [`sqlx`] errors with additional context about which
//! operation failed. Absent records are *not* errors at this layer:
//! reads return `Ok(None)` and deletes return `Ok(false)`, leaving the
//! not-found policy to the sync core.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization or deserialization error on a JSONB column.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
