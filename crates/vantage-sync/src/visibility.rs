//! The disclosure transition table.
//!
//! A disclosure-gated record is either `Disclosed` or `Hidden` to a given
//! bystander. Owners always receive the plain update; what a bystander
//! receives depends on how the gate moved:
//!
//! | old -> new | owners | bystanders |
//! |---|---|---|
//! | Disclosed -> Disclosed | Update | Update |
//! | Hidden -> Hidden | Update | nothing |
//! | Hidden -> Disclosed | Update | Create (full record, synthesized) |
//! | Disclosed -> Hidden | Update | Remove (id only, synthesized) |
//!
//! No message's presence, absence, or shape may let a bystander infer
//! that a hidden record exists, existed, or was modified. That is why a
//! reveal synthesizes a *Create* (the bystander never knew the record
//! existed) and a conceal synthesizes an id-only *Remove*, and why
//! deleting a still-hidden record is silent toward bystanders.
//!
//! Gated *scalar* attributes (name, annotation) live on a container that
//! always exists, so only their content is redacted: a gate flip reaches
//! bystanders as a synthetic value update carrying the real value or a
//! fixed placeholder, never as Create/Remove.

use vantage_types::{AttributeValue, NAME_PLACEHOLDER, Shape};

/// How a record's disclosure state moved across one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Disclosed before and after.
    StayDisclosed,
    /// Hidden before and after.
    StayHidden,
    /// Hidden before, disclosed after.
    Reveal,
    /// Disclosed before, hidden after.
    Conceal,
}

impl Transition {
    /// Classify an old/new disclosure pair.
    pub const fn of(was_disclosed: bool, now_disclosed: bool) -> Self {
        match (was_disclosed, now_disclosed) {
            (true, true) => Self::StayDisclosed,
            (false, false) => Self::StayHidden,
            (false, true) => Self::Reveal,
            (true, false) => Self::Conceal,
        }
    }

    /// The message kind a bystander receives for this transition.
    pub const fn bystander_delivery(self) -> BystanderDelivery {
        match self {
            Self::StayDisclosed => BystanderDelivery::Update,
            Self::StayHidden => BystanderDelivery::Silence,
            Self::Reveal => BystanderDelivery::Create,
            Self::Conceal => BystanderDelivery::Remove,
        }
    }
}

/// What, if anything, a bystander is told about a gated-record update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BystanderDelivery {
    /// The ordinary update, verbatim.
    Update,
    /// A synthesized creation carrying the full record.
    Create,
    /// A synthesized removal carrying the id only.
    Remove,
    /// No message at all.
    Silence,
}

/// The two disclosure-gated scalar attributes of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The display name, gated by `name_visible`.
    Name,
    /// The annotation text, gated by `annotation_visible`.
    Annotation,
}

impl Gate {
    /// Whether the gate is currently disclosed on `shape`.
    pub const fn is_open(self, shape: &Shape) -> bool {
        match self {
            Self::Name => shape.name_visible,
            Self::Annotation => shape.annotation_visible,
        }
    }

    /// The synthetic value update a bystander receives after a gate flip:
    /// the real value when the gate is now open, the fixed placeholder
    /// when it is now closed.
    pub fn bystander_value(self, shape: &Shape) -> AttributeValue {
        match self {
            Self::Name => {
                if shape.name_visible {
                    AttributeValue::Name(shape.name.clone())
                } else {
                    AttributeValue::Name(String::from(NAME_PLACEHOLDER))
                }
            }
            Self::Annotation => {
                if shape.annotation_visible {
                    AttributeValue::Annotation(shape.annotation.clone())
                } else {
                    AttributeValue::Annotation(String::new())
                }
            }
        }
    }
}

/// Fan-out class of one attribute mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeClass {
    /// Broadcast to the whole scene; carries no hidden content.
    Plain,
    /// Content gated by a disclosure flag: whole scene while open,
    /// owners only while closed.
    Gated(Gate),
    /// The gate flag itself flipped: room-wide flag update plus a
    /// synthetic per-bystander value update.
    GateFlip(Gate),
}

/// Classify an attribute mutation for fan-out.
pub const fn classify(value: &AttributeValue) -> AttributeClass {
    match value {
        AttributeValue::Name(_) => AttributeClass::Gated(Gate::Name),
        AttributeValue::Annotation(_) => AttributeClass::Gated(Gate::Annotation),
        AttributeValue::NameVisible(_) => AttributeClass::GateFlip(Gate::Name),
        AttributeValue::AnnotationVisible(_) => AttributeClass::GateFlip(Gate::Annotation),
        _ => AttributeClass::Plain,
    }
}
