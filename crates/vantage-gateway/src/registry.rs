//! The live connection registry.
//!
//! Tracks every open WebSocket connection: its user, role, currently
//! viewed scene, and outbound event channel. The registry is both
//! collaborator seams of the sync core at once: it answers audience
//! queries as the [`ConnectionDirectory`] and delivers events as the
//! [`Transport`] (one unbounded channel per connection; a send to a
//! connection that is mid-disconnect is dropped silently, matching the
//! no-ack, no-retry delivery model).

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use vantage_sync::{ConnectionDirectory, Transport};
use vantage_types::{ClientHello, ConnectionId, Role, SceneId, Shape, ShapeEvent, UserId};

/// Book-keeping for one open connection.
#[derive(Debug, Clone)]
struct Connected {
    user: UserId,
    role: Role,
    scene: SceneId,
    sender: UnboundedSender<ShapeEvent>,
    connected_at: DateTime<Utc>,
}

/// Shared registry of open connections. Cloning is cheap and clones
/// share state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<ConnectionId, Connected>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly upgraded connection and return its id.
    pub fn register(
        &self,
        hello: &ClientHello,
        sender: UnboundedSender<ShapeEvent>,
    ) -> ConnectionId {
        let connection = ConnectionId::new();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                connection,
                Connected {
                    user: hello.user,
                    role: hello.role,
                    scene: hello.scene,
                    sender,
                    connected_at: Utc::now(),
                },
            );
        tracing::debug!(
            %connection,
            user = %hello.user,
            scene = %hello.scene,
            "Connection registered"
        );
        connection
    }

    /// Drop a closed connection.
    pub fn deregister(&self, connection: ConnectionId) {
        let removed = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection);
        if let Some(entry) = removed {
            tracing::debug!(
                %connection,
                connected_at = %entry.connected_at,
                "Connection deregistered"
            );
        }
    }

    /// Move a connection's view to another scene.
    ///
    /// Returns `false` if the connection is unknown (already closed).
    pub fn switch_scene(&self, connection: ConnectionId, scene: SceneId) -> bool {
        let mut connections = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match connections.get_mut(&connection) {
            Some(entry) => {
                entry.scene = scene;
                true
            }
            None => false,
        }
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no connections are open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConnectionDirectory for ConnectionRegistry {
    fn connections_at(
        &self,
        scene: SceneId,
        excluding: Option<ConnectionId>,
    ) -> BTreeSet<ConnectionId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, entry)| entry.scene == scene && Some(**id) != excluding)
            .map(|(id, _)| *id)
            .collect()
    }

    fn owners_of(
        &self,
        shape: &Shape,
        excluding: Option<ConnectionId>,
    ) -> BTreeSet<ConnectionId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, entry)| {
                entry.scene == shape.scene
                    && Some(**id) != excluding
                    && (entry.role == Role::Gamemaster || shape.is_owned_by(entry.user))
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Transport for ConnectionRegistry {
    fn deliver(&self, to: ConnectionId, event: &ShapeEvent) {
        let sender = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&to)
            .map(|entry| entry.sender.clone());
        if let Some(sender) = sender {
            // A closed receiver means the connection is mid-disconnect;
            // the event is simply lost, as the delivery model allows.
            if sender.send(event.clone()).is_err() {
                tracing::trace!(%to, "Dropped event for closing connection");
            }
        }
    }
}
