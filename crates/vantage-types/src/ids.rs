//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record synchronized by the server has a strongly-typed ID so that
//! a tracker id can never be passed where a shape id is expected. All IDs
//! use UUID v7 (time-ordered) for efficient database indexing; the `new()`
//! constructors exist for app-side generation (mutation handlers, tests,
//! seed data).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a shape placed in a scene.
    ShapeId
}

define_id! {
    /// Unique identifier for a tracker attached to a shape.
    TrackerId
}

define_id! {
    /// Unique identifier for an aura attached to a shape.
    AuraId
}

define_id! {
    /// Unique identifier for a user-owned label.
    LabelId
}

define_id! {
    /// Unique identifier for a scene (the audience scope for broadcasts).
    SceneId
}

define_id! {
    /// Unique identifier for a registered user.
    UserId
}

define_id! {
    /// Unique identifier for a single client connection.
    ///
    /// Connections are ephemeral: one user may hold several at once, each
    /// viewing one scene.
    ConnectionId
}
