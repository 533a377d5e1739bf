//! Integration tests for the mutation broadcaster.
//!
//! Each test wires the engine to the in-memory store, a fixture
//! connection directory, and a recording transport, then checks exactly
//! which connection saw exactly which events. The scenarios follow the
//! information-disclosure rules: an unauthorized viewer must never be
//! able to infer that hidden data exists, existed, or changed.

// Tests use expect/unwrap extensively for clarity -- panicking on failure
// is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde_json::json;
use vantage_store::{MemoryStore, ShapeStore, StoreError};
use vantage_sync::{Broadcaster, ConnectionDirectory, SyncError, Transport};
use vantage_types::{
    AttributeValue, Aura, AuraId, ConnectionId, Label, LabelId, Role, SceneId, Shape, ShapeEvent,
    ShapeId, ShapeOwner, Tracker, TrackerId, TrackerPatch, UserId,
};

// =============================================================================
// Fixture directory and recording transport
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct ConnInfo {
    user: UserId,
    scene: SceneId,
    role: Role,
}

/// Shared, mutable connection directory for tests.
#[derive(Debug, Clone, Default)]
struct SceneDirectory {
    connections: Arc<Mutex<BTreeMap<ConnectionId, ConnInfo>>>,
}

impl SceneDirectory {
    fn register(&self, connection: ConnectionId, user: UserId, scene: SceneId, role: Role) {
        self.connections
            .lock()
            .unwrap()
            .insert(connection, ConnInfo { user, scene, role });
    }
}

impl ConnectionDirectory for SceneDirectory {
    fn connections_at(
        &self,
        scene: SceneId,
        excluding: Option<ConnectionId>,
    ) -> BTreeSet<ConnectionId> {
        self.connections
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, info)| info.scene == scene && Some(**id) != excluding)
            .map(|(id, _)| *id)
            .collect()
    }

    fn owners_of(
        &self,
        shape: &Shape,
        excluding: Option<ConnectionId>,
    ) -> BTreeSet<ConnectionId> {
        self.connections
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, info)| {
                info.scene == shape.scene
                    && Some(**id) != excluding
                    && (info.role == Role::Gamemaster || shape.is_owned_by(info.user))
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Transport that records every delivery for later assertions.
#[derive(Debug, Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<(ConnectionId, ShapeEvent)>>>,
}

impl RecordingTransport {
    fn events_for(&self, connection: ConnectionId) -> Vec<ShapeEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == connection)
            .map(|(_, event)| event.clone())
            .collect()
    }

    fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Transport for RecordingTransport {
    fn deliver(&self, to: ConnectionId, event: &ShapeEvent) {
        self.sent.lock().unwrap().push((to, event.clone()));
    }
}

/// A store wrapper that fails writes on demand, for abort-path tests.
#[derive(Clone)]
struct FailingStore {
    inner: MemoryStore,
    fail_writes: bool,
}

impl FailingStore {
    fn write_error(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            Err(StoreError::Config(String::from("injected write failure")))
        } else {
            Ok(())
        }
    }
}

impl ShapeStore for FailingStore {
    async fn shape(&self, id: ShapeId) -> Result<Option<Shape>, StoreError> {
        self.inner.shape(id).await
    }

    async fn save_shape(&self, shape: &Shape) -> Result<(), StoreError> {
        self.write_error()?;
        self.inner.save_shape(shape).await
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, StoreError> {
        self.write_error()?;
        self.inner.delete_shape(id).await
    }

    async fn shapes_in_scene(&self, scene: SceneId) -> Result<Vec<Shape>, StoreError> {
        self.inner.shapes_in_scene(scene).await
    }

    async fn tracker(&self, id: TrackerId) -> Result<Option<Tracker>, StoreError> {
        self.inner.tracker(id).await
    }

    async fn save_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        self.write_error()?;
        self.inner.save_tracker(tracker).await
    }

    async fn delete_tracker(&self, id: TrackerId) -> Result<bool, StoreError> {
        self.write_error()?;
        self.inner.delete_tracker(id).await
    }

    async fn aura(&self, id: AuraId) -> Result<Option<Aura>, StoreError> {
        self.inner.aura(id).await
    }

    async fn save_aura(&self, aura: &Aura) -> Result<(), StoreError> {
        self.write_error()?;
        self.inner.save_aura(aura).await
    }

    async fn delete_aura(&self, id: AuraId) -> Result<bool, StoreError> {
        self.write_error()?;
        self.inner.delete_aura(id).await
    }
}

// =============================================================================
// Test harness
// =============================================================================

/// One scene with an owning user (two connections: `origin` and
/// `owner_conn`) and a non-owning user (`bystander_conn`).
struct Harness {
    scene: SceneId,
    owner_user: UserId,
    origin: ConnectionId,
    owner_conn: ConnectionId,
    bystander_conn: ConnectionId,
    store: MemoryStore,
    directory: SceneDirectory,
    transport: RecordingTransport,
    broadcaster: Broadcaster<MemoryStore, SceneDirectory, RecordingTransport>,
}

impl Harness {
    fn new() -> Self {
        let scene = SceneId::new();
        let owner_user = UserId::new();
        let bystander_user = UserId::new();

        let origin = ConnectionId::new();
        let owner_conn = ConnectionId::new();
        let bystander_conn = ConnectionId::new();

        let directory = SceneDirectory::default();
        directory.register(origin, owner_user, scene, Role::Player);
        directory.register(owner_conn, owner_user, scene, Role::Player);
        directory.register(bystander_conn, bystander_user, scene, Role::Player);

        let store = MemoryStore::new();
        let transport = RecordingTransport::default();
        let broadcaster =
            Broadcaster::new(store.clone(), directory.clone(), transport.clone());

        Self {
            scene,
            owner_user,
            origin,
            owner_conn,
            bystander_conn,
            store,
            directory,
            transport,
            broadcaster,
        }
    }

    /// Register an extra gamemaster connection for a fresh user.
    fn add_gamemaster(&self) -> ConnectionId {
        let connection = ConnectionId::new();
        self.directory
            .register(connection, UserId::new(), self.scene, Role::Gamemaster);
        connection
    }

    /// Persist a shape owned by `owner_user` and return it.
    async fn seed_shape(&self) -> Shape {
        let mut shape = Shape::new(self.scene, "tokens");
        shape.owners.push(ShapeOwner::full(self.owner_user));
        self.store.save_shape(&shape).await.expect("seed shape");
        shape
    }

    /// Persist a tracker on `shape` with the given disclosure state.
    async fn seed_tracker(&self, shape: ShapeId, visible: bool) -> Tracker {
        let mut tracker = Tracker::new(shape, "HP");
        tracker.visible = visible;
        tracker.value = 5;
        tracker.maxvalue = 10;
        self.store.save_tracker(&tracker).await.expect("seed tracker");
        tracker
    }
}

fn visibility_patch(visible: bool) -> TrackerPatch {
    TrackerPatch {
        visible: Some(visible),
        ..TrackerPatch::default()
    }
}

// =============================================================================
// Ungated attributes
// =============================================================================

#[tokio::test]
async fn ungated_change_reaches_everyone_except_origin() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::Locked(true))
        .await
        .expect("mutation failed");

    let expected = ShapeEvent::AttributeSet {
        shape: shape.id,
        value: AttributeValue::Locked(true),
    };
    assert_eq!(h.transport.events_for(h.origin), Vec::new());
    assert_eq!(h.transport.events_for(h.owner_conn), vec![expected.clone()]);
    assert_eq!(h.transport.events_for(h.bystander_conn), vec![expected]);

    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert!(stored.is_locked);
}

#[tokio::test]
async fn option_bag_attributes_broadcast_room_wide() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::SkipDraw(true))
        .await
        .expect("mutation failed");

    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert_eq!(stored.options.get("skipDraw"), Some(&json!(true)));
    assert_eq!(h.transport.events_for(h.bystander_conn).len(), 1);
}

#[tokio::test]
async fn svg_detach_removes_only_the_newest_asset_pair() {
    let h = Harness::new();
    let mut shape = h.seed_shape().await;
    // Duplicate keys are tolerated by design; seed the bag verbatim.
    shape.options = vec![
        (String::from("svgAsset"), json!("a.svg")),
        (String::from("skipDraw"), json!(true)),
        (String::from("svgAsset"), json!("b.svg")),
    ]
    .into_iter()
    .collect();
    h.store.save_shape(&shape).await.expect("seed options");

    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::SvgAsset(None))
        .await
        .expect("mutation failed");

    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    let pairs: Vec<(String, serde_json::Value)> = stored
        .options
        .iter()
        .map(|(k, v)| (k.to_owned(), v.clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (String::from("svgAsset"), json!("a.svg")),
            (String::from("skipDraw"), json!(true)),
        ]
    );
    assert_eq!(h.transport.events_for(h.bystander_conn).len(), 1);
}

// =============================================================================
// Gated scalars and gate flips
// =============================================================================

#[tokio::test]
async fn hidden_gated_change_is_silent_to_bystanders() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    h.broadcaster
        .set_attribute(
            h.origin,
            shape.id,
            AttributeValue::Annotation(String::from("secretly a mimic")),
        )
        .await
        .expect("mutation failed");

    // Owners see the real value; bystanders see nothing at all -- not
    // even a notification that something changed.
    assert_eq!(h.transport.events_for(h.owner_conn).len(), 1);
    assert_eq!(h.transport.events_for(h.bystander_conn), Vec::new());

    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert_eq!(stored.annotation, "secretly a mimic");
}

#[tokio::test]
async fn disclosed_gated_change_reaches_everyone() {
    let h = Harness::new();
    let mut shape = h.seed_shape().await;
    shape.name_visible = true;
    h.store.save_shape(&shape).await.expect("seed gate");

    h.broadcaster
        .set_attribute(
            h.origin,
            shape.id,
            AttributeValue::Name(String::from("Ogre")),
        )
        .await
        .expect("mutation failed");

    let expected = ShapeEvent::AttributeSet {
        shape: shape.id,
        value: AttributeValue::Name(String::from("Ogre")),
    };
    assert_eq!(h.transport.events_for(h.owner_conn), vec![expected.clone()]);
    assert_eq!(h.transport.events_for(h.bystander_conn), vec![expected]);
}

#[tokio::test]
async fn name_gate_flip_sends_real_value_then_placeholder() {
    let h = Harness::new();
    let mut shape = h.seed_shape().await;
    shape.name = String::from("Ogre");
    h.store.save_shape(&shape).await.expect("seed name");

    // Disclose: the bystander's placeholder is replaced by "Ogre".
    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::NameVisible(true))
        .await
        .expect("disclose failed");

    let flag = ShapeEvent::AttributeSet {
        shape: shape.id,
        value: AttributeValue::NameVisible(true),
    };
    assert_eq!(h.transport.events_for(h.owner_conn), vec![flag.clone()]);
    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![
            flag,
            ShapeEvent::AttributeSet {
                shape: shape.id,
                value: AttributeValue::Name(String::from("Ogre")),
            },
        ]
    );

    // Conceal: the reverse transition sends the placeholder instead.
    h.transport.clear();
    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::NameVisible(false))
        .await
        .expect("conceal failed");

    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![
            ShapeEvent::AttributeSet {
                shape: shape.id,
                value: AttributeValue::NameVisible(false),
            },
            ShapeEvent::AttributeSet {
                shape: shape.id,
                value: AttributeValue::Name(String::from("?")),
            },
        ]
    );
}

#[tokio::test]
async fn annotation_gate_flip_placeholder_is_empty_string() {
    let h = Harness::new();
    let mut shape = h.seed_shape().await;
    shape.annotation = String::from("hates onions");
    shape.annotation_visible = true;
    h.store.save_shape(&shape).await.expect("seed annotation");

    h.broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::AnnotationVisible(false))
        .await
        .expect("conceal failed");

    let events = h.transport.events_for(h.bystander_conn);
    assert!(events.contains(&ShapeEvent::AttributeSet {
        shape: shape.id,
        value: AttributeValue::Annotation(String::new()),
    }));
    // The owner keeps the real value: no synthetic update addressed to it.
    assert_eq!(h.transport.events_for(h.owner_conn).len(), 1);
}

#[tokio::test]
async fn gamemaster_is_always_an_owner() {
    let h = Harness::new();
    let gm = h.add_gamemaster();
    let shape = h.seed_shape().await;

    h.broadcaster
        .set_attribute(
            h.origin,
            shape.id,
            AttributeValue::Annotation(String::from("gm eyes only")),
        )
        .await
        .expect("mutation failed");

    assert_eq!(h.transport.events_for(gm).len(), 1);
    assert_eq!(h.transport.events_for(h.bystander_conn), Vec::new());
}

// =============================================================================
// Sub-object disclosure transitions
// =============================================================================

#[tokio::test]
async fn hidden_tracker_disclosure_scenario() {
    // Tracker T(value=5, hidden) on shape E owned by U1; connections
    // C1=U1 (owner) and C2=U2 (bystander); origin is another U1
    // connection. Origin discloses T.
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, false).await;

    h.broadcaster
        .update_tracker(h.origin, shape.id, tracker.id, visibility_patch(true))
        .await
        .expect("mutation failed");

    let stored = h.store.tracker(tracker.id).await.unwrap().unwrap();
    assert!(stored.visible);

    // C1 sees the plain update.
    assert_eq!(
        h.transport.events_for(h.owner_conn),
        vec![ShapeEvent::TrackerUpdated {
            shape: shape.id,
            tracker: tracker.id,
            patch: visibility_patch(true),
        }]
    );
    // C2 sees exactly one Create with the full record, never an Update.
    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![ShapeEvent::TrackerCreated { tracker: stored }]
    );
    // Origin sees nothing.
    assert_eq!(h.transport.events_for(h.origin), Vec::new());
}

#[tokio::test]
async fn conceal_sends_id_only_remove_to_bystanders() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, true).await;

    h.broadcaster
        .update_tracker(h.origin, shape.id, tracker.id, visibility_patch(false))
        .await
        .expect("mutation failed");

    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![ShapeEvent::TrackerRemoved {
            shape: shape.id,
            tracker: tracker.id,
        }]
    );
}

#[tokio::test]
async fn hidden_tracker_update_is_silent_to_bystanders() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, false).await;

    h.broadcaster
        .update_tracker(
            h.origin,
            shape.id,
            tracker.id,
            TrackerPatch {
                value: Some(3),
                ..TrackerPatch::default()
            },
        )
        .await
        .expect("mutation failed");

    assert_eq!(h.transport.events_for(h.owner_conn).len(), 1);
    assert_eq!(h.transport.events_for(h.bystander_conn), Vec::new());
}

#[tokio::test]
async fn repeated_noop_update_never_synthesizes() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, true).await;

    let noop = TrackerPatch {
        value: Some(5),
        ..TrackerPatch::default()
    };
    for _ in 0..2 {
        h.broadcaster
            .update_tracker(h.origin, shape.id, tracker.id, noop.clone())
            .await
            .expect("mutation failed");
    }

    // One persisted state, two ordinary updates, no Create/Remove.
    let stored = h.store.tracker(tracker.id).await.unwrap().unwrap();
    assert_eq!(stored.value, 5);
    let events = h.transport.events_for(h.bystander_conn);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| matches!(
        event,
        ShapeEvent::TrackerUpdated { .. }
    )));
}

#[tokio::test]
async fn creation_respects_initial_disclosure() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    let hidden = Tracker::new(shape.id, "Rage");
    h.broadcaster
        .create_tracker(h.origin, hidden.clone())
        .await
        .expect("create failed");
    assert_eq!(h.transport.events_for(h.owner_conn).len(), 1);
    assert_eq!(h.transport.events_for(h.bystander_conn), Vec::new());

    h.transport.clear();
    let mut aura = Aura::new(shape.id, "torchlight");
    aura.visible = true;
    h.broadcaster
        .create_aura(h.origin, aura.clone())
        .await
        .expect("create failed");
    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![ShapeEvent::AuraCreated { aura }]
    );
}

#[tokio::test]
async fn deleting_a_hidden_record_is_silent_to_bystanders() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, false).await;

    h.broadcaster
        .remove_tracker(h.origin, shape.id, tracker.id)
        .await
        .expect("remove failed");

    // A Remove for a record bystanders never saw would leak its prior
    // existence; owners are told unconditionally.
    assert_eq!(
        h.transport.events_for(h.owner_conn),
        vec![ShapeEvent::TrackerRemoved {
            shape: shape.id,
            tracker: tracker.id,
        }]
    );
    assert_eq!(h.transport.events_for(h.bystander_conn), Vec::new());
    assert!(h.store.tracker(tracker.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_disclosed_record_reaches_everyone() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let mut aura = Aura::new(shape.id, "torchlight");
    aura.visible = true;
    h.store.save_aura(&aura).await.expect("seed aura");

    h.broadcaster
        .remove_aura(h.origin, shape.id, aura.id)
        .await
        .expect("remove failed");

    let expected = ShapeEvent::AuraRemoved {
        shape: shape.id,
        aura: aura.id,
    };
    assert_eq!(h.transport.events_for(h.owner_conn), vec![expected.clone()]);
    assert_eq!(h.transport.events_for(h.bystander_conn), vec![expected]);
}

// =============================================================================
// Moves
// =============================================================================

#[tokio::test]
async fn move_preserves_identity_and_emits_one_event_per_viewer() {
    let h = Harness::new();
    let source = h.seed_shape().await;
    let destination = h.seed_shape().await;
    let tracker = h.seed_tracker(source.id, true).await;

    h.broadcaster
        .move_tracker(h.origin, source.id, tracker.id, destination.id)
        .await
        .expect("move failed");

    let stored = h.store.tracker(tracker.id).await.unwrap().unwrap();
    assert_eq!(stored.id, tracker.id);
    assert_eq!(stored.shape, destination.id);
    assert_eq!(stored.value, tracker.value);
    assert_eq!(stored.name, tracker.name);

    let expected = ShapeEvent::TrackerMoved {
        shape: source.id,
        tracker: tracker.id,
        new_shape: destination.id,
    };
    assert_eq!(h.transport.events_for(h.owner_conn), vec![expected.clone()]);
    assert_eq!(h.transport.events_for(h.bystander_conn), vec![expected]);
    assert_eq!(h.transport.events_for(h.origin), Vec::new());
}

// =============================================================================
// Labels
// =============================================================================

#[tokio::test]
async fn label_attach_and_detach_broadcast_room_wide() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let label = Label {
        id: LabelId::new(),
        user: h.owner_user,
        category: Some(String::from("status")),
        name: String::from("poisoned"),
        visible: true,
    };

    h.broadcaster
        .add_label(h.origin, shape.id, label.clone())
        .await
        .expect("attach failed");
    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert_eq!(stored.labels, vec![label.clone()]);
    assert_eq!(
        h.transport.events_for(h.bystander_conn),
        vec![ShapeEvent::LabelAdded {
            shape: shape.id,
            label: label.clone(),
        }]
    );

    h.transport.clear();
    h.broadcaster
        .remove_label(h.origin, shape.id, label.id)
        .await
        .expect("detach failed");
    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert!(stored.labels.is_empty());
    assert_eq!(
        h.transport.events_for(h.owner_conn),
        vec![ShapeEvent::LabelRemoved {
            shape: shape.id,
            label: label.id,
        }]
    );
}

// =============================================================================
// Abort paths: persist-before-broadcast
// =============================================================================

#[tokio::test]
async fn missing_ids_abort_without_any_broadcast() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    let result = h
        .broadcaster
        .set_attribute(h.origin, ShapeId::new(), AttributeValue::Locked(true))
        .await;
    assert!(matches!(result, Err(SyncError::ShapeNotFound(_))));

    let result = h
        .broadcaster
        .update_tracker(h.origin, shape.id, TrackerId::new(), visibility_patch(true))
        .await;
    assert!(matches!(result, Err(SyncError::TrackerNotFound(_))));

    assert_eq!(h.transport.total(), 0);
}

#[tokio::test]
async fn sub_object_of_another_shape_is_treated_as_absent() {
    let h = Harness::new();
    let shape = h.seed_shape().await;
    let other = h.seed_shape().await;
    let tracker = h.seed_tracker(shape.id, true).await;

    let result = h
        .broadcaster
        .update_tracker(h.origin, other.id, tracker.id, visibility_patch(false))
        .await;
    assert!(matches!(result, Err(SyncError::TrackerNotFound(_))));
    assert_eq!(h.transport.total(), 0);
}

#[tokio::test]
async fn store_failure_aborts_before_any_broadcast() {
    let h = Harness::new();
    let shape = h.seed_shape().await;

    let failing = FailingStore {
        inner: h.store.clone(),
        fail_writes: true,
    };
    let broadcaster =
        Broadcaster::new(failing, h.directory.clone(), h.transport.clone());

    let result = broadcaster
        .set_attribute(h.origin, shape.id, AttributeValue::Locked(true))
        .await;
    assert!(matches!(result, Err(SyncError::Store(_))));

    // Nothing was sent and nothing was persisted: broadcast state is a
    // faithful reflection of persisted state.
    assert_eq!(h.transport.total(), 0);
    let stored = h.store.shape(shape.id).await.unwrap().unwrap();
    assert!(!stored.is_locked);
}
