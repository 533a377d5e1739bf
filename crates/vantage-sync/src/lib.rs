//! Replication and redaction core for the Vantage session server.
//!
//! Many connected viewers share the mutable shapes of a scene, but gated
//! attributes and sub-objects must stay hidden from everyone except the
//! shape's owners and gamemasters. This crate decides, for every
//! mutation, which connections receive which representation of the
//! change -- and guarantees that no message's presence, absence, or shape
//! lets an unauthorized viewer infer that hidden data exists.
//!
//! # Modules
//!
//! - [`audience`] -- Resolves the owner/bystander recipient split
//! - [`visibility`] -- The disclosure transition table and redaction rules
//! - [`broadcast`] -- The persist-then-fan-out mutation engine
//! - [`directory`] -- The read-only connection directory seam
//! - [`transport`] -- The fire-and-forget delivery seam
//! - [`error`] -- `SyncError`
//!
//! # Pipeline
//!
//! inbound mutation -> persist via [`vantage_store::ShapeStore`] ->
//! resolve [`audience::Audience`] -> pick per-audience message kinds via
//! [`visibility`] -> deliver via [`transport::Transport`].

pub mod audience;
pub mod broadcast;
pub mod directory;
pub mod error;
pub mod transport;
pub mod visibility;

pub use audience::Audience;
pub use broadcast::Broadcaster;
pub use directory::ConnectionDirectory;
pub use error::SyncError;
pub use transport::Transport;
pub use visibility::{AttributeClass, BystanderDelivery, Gate, Transition, classify};
