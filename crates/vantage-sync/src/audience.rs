//! Audience resolution for a single mutation.
//!
//! Every broadcast targets one shape, and every recipient falls into
//! exactly one of two groups: **owners** (connections of owning users and
//! gamemasters at the shape's scene) and **bystanders** (everyone else at
//! the scene). The originating connection is a member of neither -- it
//! never receives an echo of its own mutation.
//!
//! Resolution is pure and deterministic given the directory state, and is
//! performed once per mutation, after the persist succeeds.

use std::collections::BTreeSet;

use vantage_types::{ConnectionId, Shape};

use crate::directory::ConnectionDirectory;

/// The two disjoint recipient groups of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    /// Connections with elevated visibility over the shape.
    pub owners: BTreeSet<ConnectionId>,
    /// All other connections at the shape's scene.
    pub bystanders: BTreeSet<ConnectionId>,
}

impl Audience {
    /// Resolve the audience for a mutation of `shape` originating from
    /// `origin`.
    ///
    /// A connection qualifying for both groups is kept in `owners` only,
    /// so no recipient is ever addressed twice by one logical broadcast.
    pub fn resolve<D>(directory: &D, shape: &Shape, origin: ConnectionId) -> Self
    where
        D: ConnectionDirectory + ?Sized,
    {
        let owners = directory.owners_of(shape, Some(origin));
        let mut bystanders = directory.connections_at(shape.scene, Some(origin));
        bystanders.retain(|connection| !owners.contains(connection));
        Self { owners, bystanders }
    }

    /// Every recipient, owners first.
    ///
    /// Relative order between the groups is not semantically significant;
    /// owners-first is simply the fixed order this core uses.
    pub fn everyone(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.owners
            .iter()
            .chain(self.bystanders.iter())
            .copied()
    }

    /// Total recipient count.
    pub fn len(&self) -> usize {
        self.owners.len().saturating_add(self.bystanders.len())
    }

    /// Whether nobody would receive the broadcast.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.bystanders.is_empty()
    }
}
