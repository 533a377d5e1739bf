//! Outbound events fanned out to connected clients.
//!
//! Every mutation the broadcaster accepts produces zero or more
//! [`ShapeEvent`]s, each addressed to a single connection. Create events
//! carry the full record; Remove events carry ids only, so that the
//! message shape itself can never describe data the recipient is not
//! allowed to know about.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attribute::AttributeValue;
use crate::ids::{AuraId, LabelId, ShapeId, TrackerId};
use crate::shape::{Aura, AuraPatch, Label, Tracker, TrackerPatch};

/// One replicated change, as delivered to one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShapeEvent {
    /// A shape attribute changed.
    ///
    /// Also used synthetically on a disclosure-gate flip, where each
    /// bystander receives the real value or a fixed placeholder.
    AttributeSet {
        /// Target shape.
        shape: ShapeId,
        /// Attribute and new (possibly redacted) value.
        value: AttributeValue,
    },
    /// A tracker came into existence for the recipient.
    ///
    /// Sent on actual creation, and synthesized on a hidden-to-disclosed
    /// transition for recipients that never knew the record existed.
    TrackerCreated {
        /// The full tracker record (carries its owning shape).
        tracker: Tracker,
    },
    /// A tracker changed.
    TrackerUpdated {
        /// Owning shape.
        shape: ShapeId,
        /// Target tracker.
        tracker: TrackerId,
        /// The fields that changed.
        patch: TrackerPatch,
    },
    /// A tracker ceased to exist for the recipient. Carries ids only.
    TrackerRemoved {
        /// Owning shape.
        shape: ShapeId,
        /// Removed tracker.
        tracker: TrackerId,
    },
    /// A tracker was re-parented to another shape, keeping id and data.
    TrackerMoved {
        /// Previous owning shape.
        shape: ShapeId,
        /// Moved tracker.
        tracker: TrackerId,
        /// New owning shape.
        new_shape: ShapeId,
    },
    /// An aura came into existence for the recipient.
    AuraCreated {
        /// The full aura record (carries its owning shape).
        aura: Aura,
    },
    /// An aura changed.
    AuraUpdated {
        /// Owning shape.
        shape: ShapeId,
        /// Target aura.
        aura: AuraId,
        /// The fields that changed.
        patch: AuraPatch,
    },
    /// An aura ceased to exist for the recipient. Carries ids only.
    AuraRemoved {
        /// Owning shape.
        shape: ShapeId,
        /// Removed aura.
        aura: AuraId,
    },
    /// An aura was re-parented to another shape, keeping id and data.
    AuraMoved {
        /// Previous owning shape.
        shape: ShapeId,
        /// Moved aura.
        aura: AuraId,
        /// New owning shape.
        new_shape: ShapeId,
    },
    /// A label was attached to a shape.
    LabelAdded {
        /// Target shape.
        shape: ShapeId,
        /// The attached label.
        label: Label,
    },
    /// A label was detached from a shape. Carries ids only.
    LabelRemoved {
        /// Target shape.
        shape: ShapeId,
        /// Detached label.
        label: LabelId,
    },
}

impl ShapeEvent {
    /// The shape this event concerns.
    pub const fn shape(&self) -> ShapeId {
        match self {
            Self::AttributeSet { shape, .. }
            | Self::TrackerUpdated { shape, .. }
            | Self::TrackerRemoved { shape, .. }
            | Self::TrackerMoved { shape, .. }
            | Self::AuraUpdated { shape, .. }
            | Self::AuraRemoved { shape, .. }
            | Self::AuraMoved { shape, .. }
            | Self::LabelAdded { shape, .. }
            | Self::LabelRemoved { shape, .. } => *shape,
            Self::TrackerCreated { tracker } => tracker.shape,
            Self::AuraCreated { aura } => aura.shape,
        }
    }
}
