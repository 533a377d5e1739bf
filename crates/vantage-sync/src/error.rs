//! Error types for the sync core.
//!
//! The taxonomy is deliberately small: a referenced id is absent, or the
//! persistence layer failed. Either way the mutation aborts *before* any
//! fan-out, so broadcast state always reflects persisted state. There are
//! no compensating or partial broadcasts, and no retries at this layer.
//! Authorization failures never reach this core; they are resolved by an
//! external collaborator first.

use vantage_types::{AuraId, ShapeId, TrackerId};

/// Errors that can occur while processing a mutation.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The referenced shape does not exist.
    #[error("shape not found: {0}")]
    ShapeNotFound(ShapeId),

    /// The referenced tracker does not exist (or belongs to a different
    /// shape than the request claims).
    #[error("tracker not found: {0}")]
    TrackerNotFound(TrackerId),

    /// The referenced aura does not exist (or belongs to a different
    /// shape than the request claims).
    #[error("aura not found: {0}")]
    AuraNotFound(AuraId),

    /// The persistence layer failed; nothing was broadcast.
    #[error("store error: {0}")]
    Store(#[from] vantage_store::StoreError),
}
