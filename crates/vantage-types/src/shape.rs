//! Core entity records: shapes, their sub-objects, and labels.
//!
//! A [`Shape`] is the primary mutable object placed in a scene. Trackers
//! and auras are child records owned by exactly one shape; labels are
//! user-owned tags attached to many shapes through a join that does not
//! affect the label's own lifecycle.
//!
//! Disclosure gates: a shape's `name` and `annotation` carry their own
//! gate flags, and every tracker and aura carries a `visible` flag. What
//! a gate means for message fan-out is decided by the sync core; this
//! module only stores the state and offers the redacted projection used
//! by identity-less reads.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attribute::AttributeValue;
use crate::ids::{AuraId, LabelId, SceneId, ShapeId, TrackerId, UserId};
use crate::options::{OptionBag, keys};

/// Placeholder shown to non-owners in place of a hidden shape name.
pub const NAME_PLACEHOLDER: &str = "?";

/// Privilege level of a connected user within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary participant; sees only disclosed data on shapes they do
    /// not own.
    Player,
    /// Elevated role; conceptually an owner of every shape.
    Gamemaster,
}

/// One entry of the many-to-many shape/user ownership relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShapeOwner {
    /// The owning user.
    pub user: UserId,
    /// May edit the shape.
    pub edit_access: bool,
    /// May move the shape.
    pub movement_access: bool,
    /// Shares the shape's vision.
    pub vision_access: bool,
}

impl ShapeOwner {
    /// Create an owner entry with full access.
    pub const fn full(user: UserId) -> Self {
        Self {
            user,
            edit_access: true,
            movement_access: true,
            vision_access: true,
        }
    }
}

/// A user-owned tag attachable to many shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Label {
    /// Label identifier.
    pub id: LabelId,
    /// Owning user.
    pub user: UserId,
    /// Optional grouping category.
    pub category: Option<String>,
    /// Display name.
    pub name: String,
    /// Whether non-owners see the label.
    pub visible: bool,
}

/// The primary mutable shared object placed in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Shape {
    /// Shape identifier.
    pub id: ShapeId,
    /// Scene the shape is placed in.
    pub scene: SceneId,
    /// Parent layer within the scene. A shape belongs to exactly one
    /// layer at any instant.
    pub layer: String,
    /// Display name.
    pub name: String,
    /// Whether non-owners see the real name.
    pub name_visible: bool,
    /// Free-text annotation.
    pub annotation: String,
    /// Whether non-owners see the annotation.
    pub annotation_visible: bool,
    /// Outline colour.
    pub stroke_colour: String,
    /// Fill colour.
    pub fill_colour: String,
    /// Shape cannot be moved or edited by non-owners.
    pub is_locked: bool,
    /// Shape is hidden from the scene entirely.
    pub is_invisible: bool,
    /// Shape is marked defeated.
    pub is_defeated: bool,
    /// Shape acts as a token.
    pub is_token: bool,
    /// Shape obstructs movement.
    pub blocks_movement: bool,
    /// Shape obstructs vision.
    pub blocks_vision: bool,
    /// Shape is a door.
    pub is_door: bool,
    /// Shape is a teleport zone.
    pub is_teleport_zone: bool,
    /// Numbered badge shown next to the shape.
    pub badge: u32,
    /// Whether the badge is shown.
    pub show_badge: bool,
    /// Ordered extensible attribute bag.
    pub options: OptionBag,
    /// Ownership relation entries.
    pub owners: Vec<ShapeOwner>,
    /// Attached labels.
    pub labels: Vec<Label>,
}

impl Shape {
    /// Create a shape with default attributes on the given scene layer.
    pub fn new(scene: SceneId, layer: impl Into<String>) -> Self {
        Self {
            id: ShapeId::new(),
            scene,
            layer: layer.into(),
            name: String::new(),
            name_visible: false,
            annotation: String::new(),
            annotation_visible: false,
            stroke_colour: String::from("#000000"),
            fill_colour: String::from("#ffffff"),
            is_locked: false,
            is_invisible: false,
            is_defeated: false,
            is_token: false,
            blocks_movement: false,
            blocks_vision: false,
            is_door: false,
            is_teleport_zone: false,
            badge: 0,
            show_badge: false,
            options: OptionBag::new(),
            owners: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Whether the given user is in the shape's owner relation.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owners.iter().any(|owner| owner.user == user)
    }

    /// Apply one attribute mutation to the in-memory record.
    ///
    /// This is the single write path the broadcaster uses before
    /// persisting; option-bag attributes route through the bag's
    /// upsert/patch/detach operations.
    pub fn apply(&mut self, value: &AttributeValue) {
        match value {
            AttributeValue::Locked(flag) => self.is_locked = *flag,
            AttributeValue::Invisible(flag) => self.is_invisible = *flag,
            AttributeValue::Defeated(flag) => self.is_defeated = *flag,
            AttributeValue::Token(flag) => self.is_token = *flag,
            AttributeValue::BlocksMovement(flag) => self.blocks_movement = *flag,
            AttributeValue::BlocksVision(flag) => self.blocks_vision = *flag,
            AttributeValue::Door(flag) => self.is_door = *flag,
            AttributeValue::TeleportZone(flag) => self.is_teleport_zone = *flag,
            AttributeValue::ShowBadge(flag) => self.show_badge = *flag,
            AttributeValue::StrokeColour(colour) => self.stroke_colour = colour.clone(),
            AttributeValue::FillColour(colour) => self.fill_colour = colour.clone(),
            AttributeValue::Layer(layer) => self.layer = layer.clone(),
            AttributeValue::Name(name) => self.name = name.clone(),
            AttributeValue::NameVisible(flag) => self.name_visible = *flag,
            AttributeValue::Annotation(text) => self.annotation = text.clone(),
            AttributeValue::AnnotationVisible(flag) => self.annotation_visible = *flag,
            AttributeValue::DoorPermissions(permissions) => {
                self.options.upsert(keys::DOOR, permissions.to_value());
            }
            AttributeValue::TeleportSettings(settings) => {
                self.options.upsert(keys::TELEPORT, settings.to_value());
            }
            AttributeValue::TeleportImmediate(flag) => {
                self.options.patch(keys::TELEPORT, |stored| {
                    if let Some(object) = stored.as_object_mut() {
                        object.insert(
                            String::from("immediate"),
                            serde_json::Value::Bool(*flag),
                        );
                    }
                });
            }
            AttributeValue::SkipDraw(flag) => {
                self.options
                    .upsert(keys::SKIP_DRAW, serde_json::Value::Bool(*flag));
            }
            AttributeValue::SvgAsset(Some(asset)) => {
                self.options
                    .upsert(keys::SVG_ASSET, serde_json::Value::String(asset.clone()));
            }
            AttributeValue::SvgAsset(None) => {
                // Detaching the asset drops the whole cached family, each
                // at its most recently appended occurrence.
                for key in [
                    keys::SVG_ASSET,
                    keys::SVG_PATHS,
                    keys::SVG_WIDTH,
                    keys::SVG_HEIGHT,
                ] {
                    self.options.detach_last(key);
                }
            }
        }
    }

    /// The projection served to identity-less reads.
    ///
    /// Hidden scalar content is replaced, not omitted: the name becomes
    /// [`NAME_PLACEHOLDER`] and the annotation becomes empty, because the
    /// fields themselves always exist. Hidden labels are dropped.
    pub fn redacted(&self) -> Self {
        let mut public = self.clone();
        if !public.name_visible {
            public.name = String::from(NAME_PLACEHOLDER);
        }
        if !public.annotation_visible {
            public.annotation = String::new();
        }
        public.labels.retain(|label| label.visible);
        public
    }
}

/// A numeric progress tracker attached to a shape (hit points, charges,
/// countdowns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tracker {
    /// Tracker identifier; survives re-parenting.
    pub id: TrackerId,
    /// Owning shape.
    pub shape: ShapeId,
    /// Whether non-owners see the tracker at all.
    pub visible: bool,
    /// Display name.
    pub name: String,
    /// Current value.
    pub value: i32,
    /// Maximum value (0 when unbounded).
    pub maxvalue: i32,
    /// Render the tracker as a bar on the shape.
    pub draw: bool,
    /// Bar fill colour.
    pub primary_colour: String,
    /// Bar background colour.
    pub secondary_colour: String,
}

impl Tracker {
    /// Create a hidden tracker with zeroed values on the given shape.
    pub fn new(shape: ShapeId, name: impl Into<String>) -> Self {
        Self {
            id: TrackerId::new(),
            shape,
            visible: false,
            name: name.into(),
            value: 0,
            maxvalue: 0,
            draw: false,
            primary_colour: String::from("#00ff00"),
            secondary_colour: String::from("#888888"),
        }
    }

    /// Merge a partial update into the record.
    pub fn apply(&mut self, patch: &TrackerPatch) {
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(maxvalue) = patch.maxvalue {
            self.maxvalue = maxvalue;
        }
        if let Some(draw) = patch.draw {
            self.draw = draw;
        }
        if let Some(colour) = &patch.primary_colour {
            self.primary_colour = colour.clone();
        }
        if let Some(colour) = &patch.secondary_colour {
            self.secondary_colour = colour.clone();
        }
    }
}

/// A partial tracker update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackerPatch {
    /// New disclosure state.
    pub visible: Option<bool>,
    /// New display name.
    pub name: Option<String>,
    /// New current value.
    pub value: Option<i32>,
    /// New maximum value.
    pub maxvalue: Option<i32>,
    /// New bar rendering flag.
    pub draw: Option<bool>,
    /// New bar fill colour.
    pub primary_colour: Option<String>,
    /// New bar background colour.
    pub secondary_colour: Option<String>,
}

/// A radial emanation attached to a shape (light, fear, silence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Aura {
    /// Aura identifier; survives re-parenting.
    pub id: AuraId,
    /// Owning shape.
    pub shape: ShapeId,
    /// Whether non-owners see the aura at all.
    pub visible: bool,
    /// Whether the aura acts as a vision source for its owners.
    pub vision_source: bool,
    /// Display name.
    pub name: String,
    /// Bright radius in grid units.
    pub value: u32,
    /// Additional dim radius in grid units.
    pub dim: u32,
    /// Aura colour.
    pub colour: String,
}

impl Aura {
    /// Create a hidden aura with zero radius on the given shape.
    pub fn new(shape: ShapeId, name: impl Into<String>) -> Self {
        Self {
            id: AuraId::new(),
            shape,
            visible: false,
            vision_source: false,
            name: name.into(),
            value: 0,
            dim: 0,
            colour: String::from("rgba(0,0,0,0)"),
        }
    }

    /// Merge a partial update into the record.
    pub fn apply(&mut self, patch: &AuraPatch) {
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(vision_source) = patch.vision_source {
            self.vision_source = vision_source;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(dim) = patch.dim {
            self.dim = dim;
        }
        if let Some(colour) = &patch.colour {
            self.colour = colour.clone();
        }
    }
}

/// A partial aura update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AuraPatch {
    /// New disclosure state.
    pub visible: Option<bool>,
    /// New vision-source flag.
    pub vision_source: Option<bool>,
    /// New display name.
    pub name: Option<String>,
    /// New bright radius.
    pub value: Option<u32>,
    /// New dim radius.
    pub dim: Option<u32>,
    /// New colour.
    pub colour: Option<String>,
}
