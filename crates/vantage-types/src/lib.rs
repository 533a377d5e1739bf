//! Shared type definitions for the Vantage session server.
//!
//! This crate is the single source of truth for all types used across the
//! Vantage workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`shape`] -- Shapes, trackers, auras, labels, ownership, roles
//! - [`options`] -- The ordered key/value option bag
//! - [`attribute`] -- Attribute values carried by shape mutations
//! - [`request`] -- Inbound client wire messages
//! - [`event`] -- Outbound replicated events

pub mod attribute;
pub mod event;
pub mod ids;
pub mod options;
pub mod request;
pub mod shape;

// Re-export all public types at crate root for convenience.
pub use attribute::{AttributeValue, LogicPermissions, TeleportSettings, TeleportTarget};
pub use event::ShapeEvent;
pub use ids::{AuraId, ConnectionId, LabelId, SceneId, ShapeId, TrackerId, UserId};
pub use options::{OptionBag, keys};
pub use request::{ClientHello, ClientRequest};
pub use shape::{
    Aura, AuraPatch, Label, NAME_PLACEHOLDER, Role, Shape, ShapeOwner, Tracker, TrackerPatch,
};
