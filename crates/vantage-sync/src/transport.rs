//! The outbound delivery seam.
//!
//! Fan-out is fire-and-forget: [`Transport::deliver`] must not block, is
//! never acknowledged, and is never retried -- a disconnected recipient
//! simply receives nothing. Delivery timing is the transport's concern;
//! the only ordering guarantee the core relies on is that messages to a
//! single connection arrive in the order they were delivered here.

use vantage_types::{ConnectionId, ShapeEvent};

/// Non-blocking per-connection event delivery.
pub trait Transport: Send + Sync {
    /// Hand one event to one connection's outbound queue.
    fn deliver(&self, to: ConnectionId, event: &ShapeEvent);
}
