//! Inbound wire messages from connected clients.
//!
//! A client opens its WebSocket with a [`ClientHello`] frame identifying
//! the user, role, and viewed scene (authentication happens upstream;
//! the gateway trusts the hello). Every later frame is a
//! [`ClientRequest`] -- one of the mutation kinds the broadcaster
//! accepts, plus the scene-switch bookkeeping message.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attribute::AttributeValue;
use crate::ids::{AuraId, LabelId, SceneId, ShapeId, TrackerId, UserId};
use crate::shape::{Aura, AuraPatch, Label, Role, Tracker, TrackerPatch};

/// First frame of a WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClientHello {
    /// Authenticated user behind the connection.
    pub user: UserId,
    /// Privilege level within the session.
    pub role: Role,
    /// Scene the connection is viewing.
    pub scene: SceneId,
}

/// One inbound mutation (or connection bookkeeping) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Set one shape attribute (flags, colours, gated scalars, gates,
    /// option-bag attributes).
    SetAttribute {
        /// Target shape.
        shape: ShapeId,
        /// Attribute and new value.
        value: AttributeValue,
    },
    /// Create a tracker.
    CreateTracker {
        /// The new record, including its owning shape.
        tracker: Tracker,
    },
    /// Partially update a tracker.
    UpdateTracker {
        /// Owning shape.
        shape: ShapeId,
        /// Target tracker.
        tracker: TrackerId,
        /// Fields to change.
        patch: TrackerPatch,
    },
    /// Re-parent a tracker to another shape.
    MoveTracker {
        /// Current owning shape.
        shape: ShapeId,
        /// Target tracker.
        tracker: TrackerId,
        /// New owning shape.
        new_shape: ShapeId,
    },
    /// Delete a tracker.
    RemoveTracker {
        /// Owning shape.
        shape: ShapeId,
        /// Target tracker.
        tracker: TrackerId,
    },
    /// Create an aura.
    CreateAura {
        /// The new record, including its owning shape.
        aura: Aura,
    },
    /// Partially update an aura.
    UpdateAura {
        /// Owning shape.
        shape: ShapeId,
        /// Target aura.
        aura: AuraId,
        /// Fields to change.
        patch: AuraPatch,
    },
    /// Re-parent an aura to another shape.
    MoveAura {
        /// Current owning shape.
        shape: ShapeId,
        /// Target aura.
        aura: AuraId,
        /// New owning shape.
        new_shape: ShapeId,
    },
    /// Delete an aura.
    RemoveAura {
        /// Owning shape.
        shape: ShapeId,
        /// Target aura.
        aura: AuraId,
    },
    /// Attach a label to a shape.
    AddLabel {
        /// Target shape.
        shape: ShapeId,
        /// Label to attach.
        label: Label,
    },
    /// Detach a label from a shape.
    RemoveLabel {
        /// Target shape.
        shape: ShapeId,
        /// Label to detach.
        label: LabelId,
    },
    /// Move this connection's view to another scene.
    SwitchScene {
        /// Scene now being viewed.
        scene: SceneId,
    },
}
