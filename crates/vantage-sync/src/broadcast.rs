//! Persist-then-fan-out orchestration for every mutation kind.
//!
//! The broadcaster is the single entry point for inbound mutations. Each
//! operation runs the same two-phase pipeline:
//!
//! 1. **Persist** the change through the [`ShapeStore`]. A missing id or
//!    a store failure aborts here -- nothing is ever broadcast for a
//!    failed mutation, so persisted state and broadcast state cannot
//!    diverge.
//! 2. **Fan out**: resolve the [`Audience`] fresh from the directory,
//!    then deliver per-recipient events according to the disclosure
//!    rules in [`visibility`](crate::visibility).
//!
//! The origin connection is excluded from every audience. Sends are
//! fire-and-forget; there is no delivery acknowledgment and no retry.

use vantage_store::ShapeStore;
use vantage_types::{
    AttributeValue, Aura, AuraId, AuraPatch, ConnectionId, Label, LabelId, Shape, ShapeEvent,
    ShapeId, Tracker, TrackerId, TrackerPatch,
};

use crate::audience::Audience;
use crate::directory::ConnectionDirectory;
use crate::error::SyncError;
use crate::transport::Transport;
use crate::visibility::{AttributeClass, BystanderDelivery, Transition, classify};

/// The mutation engine: persists through `S`, resolves audiences through
/// `D`, and delivers events through `T`.
pub struct Broadcaster<S, D, T> {
    store: S,
    directory: D,
    transport: T,
}

impl<S, D, T> Broadcaster<S, D, T>
where
    S: ShapeStore,
    D: ConnectionDirectory,
    T: Transport,
{
    /// Assemble the engine from its three collaborators.
    pub const fn new(store: S, directory: D, transport: T) -> Self {
        Self {
            store,
            directory,
            transport,
        }
    }

    /// The underlying store, shared with read-side consumers.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Set one shape attribute and replicate the change.
    ///
    /// Plain attributes go to everyone at the scene except the origin.
    /// Gated scalars (name, annotation) go to everyone while their gate
    /// is disclosed, and to owners only while it is hidden -- bystanders
    /// receive nothing at all in that case. Flipping a gate sends the
    /// flag room-wide plus a synthetic value update to each bystander,
    /// carrying the real value or the fixed placeholder.
    pub async fn set_attribute(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        value: AttributeValue,
    ) -> Result<(), SyncError> {
        let mut shape = self.load_shape(shape_id).await?;
        shape.apply(&value);
        self.store.save_shape(&shape).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        tracing::debug!(
            shape = %shape.id,
            recipients = audience.len(),
            "Attribute mutation persisted"
        );

        match classify(&value) {
            AttributeClass::Plain => {
                let event = ShapeEvent::AttributeSet {
                    shape: shape.id,
                    value,
                };
                self.fan_out(audience.everyone(), &event);
            }
            AttributeClass::Gated(gate) => {
                let event = ShapeEvent::AttributeSet {
                    shape: shape.id,
                    value,
                };
                if gate.is_open(&shape) {
                    self.fan_out(audience.everyone(), &event);
                } else {
                    self.fan_out(audience.owners.iter().copied(), &event);
                }
            }
            AttributeClass::GateFlip(gate) => {
                let flag_event = ShapeEvent::AttributeSet {
                    shape: shape.id,
                    value,
                };
                self.fan_out(audience.everyone(), &flag_event);

                // Bystanders see different content than owners in the same
                // logical event, so each gets an individually addressed
                // synthetic update.
                let synthetic = ShapeEvent::AttributeSet {
                    shape: shape.id,
                    value: gate.bystander_value(&shape),
                };
                self.fan_out(audience.bystanders.iter().copied(), &synthetic);
            }
        }
        Ok(())
    }

    /// Create a tracker and replicate it.
    ///
    /// Owners always receive the full record; bystanders only when its
    /// initial disclosure state is visible.
    pub async fn create_tracker(
        &self,
        origin: ConnectionId,
        tracker: Tracker,
    ) -> Result<(), SyncError> {
        let shape = self.load_shape(tracker.shape).await?;
        self.store.save_tracker(&tracker).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let disclosed = tracker.visible;
        let event = ShapeEvent::TrackerCreated { tracker };
        self.fan_out(audience.owners.iter().copied(), &event);
        if disclosed {
            self.fan_out(audience.bystanders.iter().copied(), &event);
        }
        Ok(())
    }

    /// Partially update a tracker and replicate the change.
    ///
    /// Owners receive the patch verbatim. The bystander message kind is
    /// chosen by the disclosure transition: an ordinary update while
    /// disclosed, silence while hidden, a synthesized Create on reveal,
    /// an id-only Remove on conceal.
    pub async fn update_tracker(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: TrackerId,
        patch: TrackerPatch,
    ) -> Result<(), SyncError> {
        let shape = self.load_shape(shape_id).await?;
        let mut tracker = self
            .store
            .tracker(id)
            .await?
            .filter(|t| t.shape == shape.id)
            .ok_or(SyncError::TrackerNotFound(id))?;

        let was_disclosed = tracker.visible;
        tracker.apply(&patch);
        self.store.save_tracker(&tracker).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let update = ShapeEvent::TrackerUpdated {
            shape: shape.id,
            tracker: id,
            patch,
        };
        self.fan_out(audience.owners.iter().copied(), &update);

        let transition = Transition::of(was_disclosed, tracker.visible);
        match transition.bystander_delivery() {
            BystanderDelivery::Update => {
                self.fan_out(audience.bystanders.iter().copied(), &update);
            }
            BystanderDelivery::Create => {
                let created = ShapeEvent::TrackerCreated { tracker };
                self.fan_out(audience.bystanders.iter().copied(), &created);
            }
            BystanderDelivery::Remove => {
                let removed = ShapeEvent::TrackerRemoved {
                    shape: shape.id,
                    tracker: id,
                };
                self.fan_out(audience.bystanders.iter().copied(), &removed);
            }
            BystanderDelivery::Silence => {}
        }
        Ok(())
    }

    /// Re-parent a tracker onto another shape, preserving id and data.
    ///
    /// Exactly one Move event reaches every scene connection but the
    /// origin; trackers carry no per-recipient content on a move.
    pub async fn move_tracker(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: TrackerId,
        new_shape: ShapeId,
    ) -> Result<(), SyncError> {
        let destination = self.load_shape(new_shape).await?;
        let mut tracker = self
            .store
            .tracker(id)
            .await?
            .filter(|t| t.shape == shape_id)
            .ok_or(SyncError::TrackerNotFound(id))?;

        tracker.shape = destination.id;
        self.store.save_tracker(&tracker).await?;

        let audience = Audience::resolve(&self.directory, &destination, origin);
        let event = ShapeEvent::TrackerMoved {
            shape: shape_id,
            tracker: id,
            new_shape: destination.id,
        };
        self.fan_out(audience.everyone(), &event);
        Ok(())
    }

    /// Delete a tracker and replicate the removal.
    ///
    /// Owners are told unconditionally. Bystanders are told only if the
    /// record was disclosed at deletion time -- a Remove for a record
    /// they never saw would itself leak its prior existence.
    pub async fn remove_tracker(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: TrackerId,
    ) -> Result<(), SyncError> {
        let shape = self.load_shape(shape_id).await?;
        let tracker = self
            .store
            .tracker(id)
            .await?
            .filter(|t| t.shape == shape.id)
            .ok_or(SyncError::TrackerNotFound(id))?;

        let was_disclosed = tracker.visible;
        self.store.delete_tracker(id).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let event = ShapeEvent::TrackerRemoved {
            shape: shape.id,
            tracker: id,
        };
        self.fan_out(audience.owners.iter().copied(), &event);
        if was_disclosed {
            self.fan_out(audience.bystanders.iter().copied(), &event);
        }
        Ok(())
    }

    /// Create an aura and replicate it. Same disclosure rules as
    /// [`Broadcaster::create_tracker`].
    pub async fn create_aura(&self, origin: ConnectionId, aura: Aura) -> Result<(), SyncError> {
        let shape = self.load_shape(aura.shape).await?;
        self.store.save_aura(&aura).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let disclosed = aura.visible;
        let event = ShapeEvent::AuraCreated { aura };
        self.fan_out(audience.owners.iter().copied(), &event);
        if disclosed {
            self.fan_out(audience.bystanders.iter().copied(), &event);
        }
        Ok(())
    }

    /// Partially update an aura and replicate the change. Same transition
    /// rules as [`Broadcaster::update_tracker`].
    pub async fn update_aura(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: AuraId,
        patch: AuraPatch,
    ) -> Result<(), SyncError> {
        let shape = self.load_shape(shape_id).await?;
        let mut aura = self
            .store
            .aura(id)
            .await?
            .filter(|a| a.shape == shape.id)
            .ok_or(SyncError::AuraNotFound(id))?;

        let was_disclosed = aura.visible;
        aura.apply(&patch);
        self.store.save_aura(&aura).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let update = ShapeEvent::AuraUpdated {
            shape: shape.id,
            aura: id,
            patch,
        };
        self.fan_out(audience.owners.iter().copied(), &update);

        match Transition::of(was_disclosed, aura.visible).bystander_delivery() {
            BystanderDelivery::Update => {
                self.fan_out(audience.bystanders.iter().copied(), &update);
            }
            BystanderDelivery::Create => {
                let created = ShapeEvent::AuraCreated { aura };
                self.fan_out(audience.bystanders.iter().copied(), &created);
            }
            BystanderDelivery::Remove => {
                let removed = ShapeEvent::AuraRemoved {
                    shape: shape.id,
                    aura: id,
                };
                self.fan_out(audience.bystanders.iter().copied(), &removed);
            }
            BystanderDelivery::Silence => {}
        }
        Ok(())
    }

    /// Re-parent an aura onto another shape, preserving id and data.
    pub async fn move_aura(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: AuraId,
        new_shape: ShapeId,
    ) -> Result<(), SyncError> {
        let destination = self.load_shape(new_shape).await?;
        let mut aura = self
            .store
            .aura(id)
            .await?
            .filter(|a| a.shape == shape_id)
            .ok_or(SyncError::AuraNotFound(id))?;

        aura.shape = destination.id;
        self.store.save_aura(&aura).await?;

        let audience = Audience::resolve(&self.directory, &destination, origin);
        let event = ShapeEvent::AuraMoved {
            shape: shape_id,
            aura: id,
            new_shape: destination.id,
        };
        self.fan_out(audience.everyone(), &event);
        Ok(())
    }

    /// Delete an aura and replicate the removal. Same disclosure rules as
    /// [`Broadcaster::remove_tracker`].
    pub async fn remove_aura(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        id: AuraId,
    ) -> Result<(), SyncError> {
        let shape = self.load_shape(shape_id).await?;
        let aura = self
            .store
            .aura(id)
            .await?
            .filter(|a| a.shape == shape.id)
            .ok_or(SyncError::AuraNotFound(id))?;

        let was_disclosed = aura.visible;
        self.store.delete_aura(id).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let event = ShapeEvent::AuraRemoved {
            shape: shape.id,
            aura: id,
        };
        self.fan_out(audience.owners.iter().copied(), &event);
        if was_disclosed {
            self.fan_out(audience.bystanders.iter().copied(), &event);
        }
        Ok(())
    }

    /// Attach a label to a shape and replicate room-wide.
    ///
    /// Re-attaching a label that is already present replaces the stored
    /// copy (labels have their own lifecycle; the attachment is all this
    /// shape owns).
    pub async fn add_label(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        label: Label,
    ) -> Result<(), SyncError> {
        let mut shape = self.load_shape(shape_id).await?;
        shape.labels.retain(|existing| existing.id != label.id);
        shape.labels.push(label.clone());
        self.store.save_shape(&shape).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let event = ShapeEvent::LabelAdded {
            shape: shape.id,
            label,
        };
        self.fan_out(audience.everyone(), &event);
        Ok(())
    }

    /// Detach a label from a shape and replicate room-wide.
    pub async fn remove_label(
        &self,
        origin: ConnectionId,
        shape_id: ShapeId,
        label: LabelId,
    ) -> Result<(), SyncError> {
        let mut shape = self.load_shape(shape_id).await?;
        shape.labels.retain(|existing| existing.id != label);
        self.store.save_shape(&shape).await?;

        let audience = Audience::resolve(&self.directory, &shape, origin);
        let event = ShapeEvent::LabelRemoved {
            shape: shape.id,
            label,
        };
        self.fan_out(audience.everyone(), &event);
        Ok(())
    }

    /// Fetch a shape or abort the mutation.
    async fn load_shape(&self, id: ShapeId) -> Result<Shape, SyncError> {
        self.store
            .shape(id)
            .await?
            .ok_or(SyncError::ShapeNotFound(id))
    }

    /// Deliver one event to each target, in iteration order.
    fn fan_out<I>(&self, targets: I, event: &ShapeEvent)
    where
        I: IntoIterator<Item = ConnectionId>,
    {
        for connection in targets {
            self.transport.deliver(connection, event);
        }
    }
}
