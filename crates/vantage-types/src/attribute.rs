//! Attribute values carried by shape mutations.
//!
//! Every per-shape attribute mutation -- boolean flags, colours, the
//! gated name/annotation scalars, their disclosure gates, and the
//! option-bag attributes -- is expressed as one [`AttributeValue`]
//! variant. This collapses what would otherwise be thirty near-identical
//! mutation handlers into a single broadcast engine keyed on the variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::{SceneId, ShapeId, UserId};

/// Per-user permission triage for interactive logic (doors, teleports).
///
/// Users in `enabled` may use the feature directly, users in `request`
/// trigger a confirmation request to the gamemaster, users in `disabled`
/// are refused outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogicPermissions {
    /// Users allowed to use the feature without confirmation.
    pub enabled: Vec<UserId>,
    /// Users whose use requires gamemaster confirmation.
    pub request: Vec<UserId>,
    /// Users refused outright.
    pub disabled: Vec<UserId>,
}

impl LogicPermissions {
    /// Encode the permissions as a JSON value for option-bag storage.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "enabled": self.enabled,
            "request": self.request,
            "disabled": self.disabled,
        })
    }
}

/// Destination of a teleport zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeleportTarget {
    /// Scene the zone teleports to.
    pub scene: SceneId,
    /// Spawn shape within the target scene, if a specific one is set.
    pub spawn: Option<ShapeId>,
}

/// Full teleport zone settings stored under the `teleport` option key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeleportSettings {
    /// Who may use the zone.
    pub permissions: LogicPermissions,
    /// Where the zone leads.
    pub target: Option<TeleportTarget>,
    /// Whether entering the zone teleports without confirmation.
    pub immediate: bool,
}

impl TeleportSettings {
    /// Encode the settings as a JSON value for option-bag storage.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "permissions": self.permissions.to_value(),
            "target": self.target,
            "immediate": self.immediate,
        })
    }
}

/// One mutated shape attribute together with its new value.
///
/// The first nine variants are plain boolean flags broadcast to the whole
/// scene. `Name` and `Annotation` are disclosure-gated scalars;
/// `NameVisible` and `AnnotationVisible` are their gates. The remaining
/// variants are stored in the shape's option bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Shape can no longer be moved or edited by non-owners.
    Locked(bool),
    /// Shape is hidden from the scene entirely.
    Invisible(bool),
    /// Shape is marked defeated.
    Defeated(bool),
    /// Shape acts as a token (a player-controllable presence).
    Token(bool),
    /// Shape obstructs movement.
    BlocksMovement(bool),
    /// Shape obstructs vision.
    BlocksVision(bool),
    /// Shape is a door.
    Door(bool),
    /// Shape is a teleport zone.
    TeleportZone(bool),
    /// Show the numbered badge next to the shape.
    ShowBadge(bool),
    /// Outline colour.
    StrokeColour(String),
    /// Fill colour.
    FillColour(String),
    /// Parent layer within the scene. A shape belongs to exactly one
    /// layer at any instant; the move is atomic.
    Layer(String),
    /// Display name. Gated by [`AttributeValue::NameVisible`].
    Name(String),
    /// Disclosure gate for the name.
    NameVisible(bool),
    /// Free-text annotation. Gated by [`AttributeValue::AnnotationVisible`].
    Annotation(String),
    /// Disclosure gate for the annotation.
    AnnotationVisible(bool),
    /// Door interaction permissions (option bag, `door` key).
    DoorPermissions(LogicPermissions),
    /// Teleport zone settings (option bag, `teleport` key).
    TeleportSettings(TeleportSettings),
    /// Nested patch of the `immediate` flag inside existing teleport
    /// settings.
    TeleportImmediate(bool),
    /// Skip the shape during rendering (option bag, `skipDraw` key).
    SkipDraw(bool),
    /// Vector asset reference (option bag, `svgAsset` key). `None`
    /// detaches the asset and its cached companion keys.
    SvgAsset(Option<String>),
}
