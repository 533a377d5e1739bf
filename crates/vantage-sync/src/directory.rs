//! The connection directory seam.
//!
//! The directory knows which connections exist, which user and scene each
//! one belongs to, and which role the user holds. The sync core only ever
//! *reads* it, and queries it fresh for every mutation -- a membership
//! change that happens after resolution is not retroactively reflected in
//! an in-flight broadcast.
//!
//! The directory is passed in explicitly wherever it is needed; the core
//! keeps no ambient global connection state.

use std::collections::BTreeSet;

use vantage_types::{ConnectionId, SceneId, Shape};

/// Read-only view of the connected-client population.
pub trait ConnectionDirectory: Send + Sync {
    /// Every connection currently viewing `scene`, minus `excluding`.
    fn connections_at(
        &self,
        scene: SceneId,
        excluding: Option<ConnectionId>,
    ) -> BTreeSet<ConnectionId>;

    /// Every connection at the shape's scene whose user is in the shape's
    /// owner relation or holds the gamemaster role, minus `excluding`.
    ///
    /// A gamemaster is conceptually an owner of every shape.
    fn owners_of(&self, shape: &Shape, excluding: Option<ConnectionId>)
    -> BTreeSet<ConnectionId>;
}
