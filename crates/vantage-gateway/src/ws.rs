//! `WebSocket` session handling.
//!
//! A client connects to `GET /ws` and sends a [`ClientHello`] as its
//! first text frame. From then on, every inbound text frame is a
//! [`ClientRequest`] dispatched to the broadcaster, and every event the
//! sync core addresses to this connection is forwarded as a JSON text
//! frame. The select loop mirrors both directions until either side
//! closes.
//!
//! A failed mutation is silent on the wire: it is logged here and no
//! compensating message is sent to anyone, so other viewers observe no
//! change at all. (An explicit error reply to the origin would layer on
//! top of this; silence is the default.)

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vantage_types::{ClientHello, ClientRequest, ConnectionId};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` replication session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_session(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_session(socket, state))
}

/// Run one connection's session: hello, then mirrored traffic.
async fn handle_session(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(hello) = read_hello(&mut socket).await else {
        debug!("WebSocket closed before a valid hello frame");
        return;
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection = state.registry.register(&hello, tx);

    loop {
        tokio::select! {
            // An event the sync core addressed to this connection.
            outbound = rx.recv() => {
                match outbound {
                    Some(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize outbound event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            break;
                        }
                    }
                    None => break,
                }
            }
            // A frame from the client.
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        dispatch(&state, connection, text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore binary frames and pongs.
                    }
                }
            }
        }
    }

    state.registry.deregister(connection);
}

/// Wait for the hello frame that identifies the connection.
///
/// Non-text frames before the hello are skipped; a malformed hello or a
/// closed socket ends the session before registration, so the connection
/// never joins any audience.
async fn read_hello(socket: &mut WebSocket) -> Option<ClientHello> {
    loop {
        match socket.recv().await? {
            Ok(Message::Text(text)) => {
                return serde_json::from_str(text.as_str())
                    .map_err(|e| debug!("Malformed hello frame: {e}"))
                    .ok();
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parse and execute one inbound request.
async fn dispatch(state: &Arc<AppState>, connection: ConnectionId, text: &str) {
    let request: ClientRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            debug!(%connection, "Malformed request frame: {e}");
            return;
        }
    };

    let broadcaster = &state.broadcaster;
    let result = match request {
        ClientRequest::SetAttribute { shape, value } => {
            broadcaster.set_attribute(connection, shape, value).await
        }
        ClientRequest::CreateTracker { tracker } => {
            broadcaster.create_tracker(connection, tracker).await
        }
        ClientRequest::UpdateTracker {
            shape,
            tracker,
            patch,
        } => {
            broadcaster
                .update_tracker(connection, shape, tracker, patch)
                .await
        }
        ClientRequest::MoveTracker {
            shape,
            tracker,
            new_shape,
        } => {
            broadcaster
                .move_tracker(connection, shape, tracker, new_shape)
                .await
        }
        ClientRequest::RemoveTracker { shape, tracker } => {
            broadcaster.remove_tracker(connection, shape, tracker).await
        }
        ClientRequest::CreateAura { aura } => broadcaster.create_aura(connection, aura).await,
        ClientRequest::UpdateAura { shape, aura, patch } => {
            broadcaster.update_aura(connection, shape, aura, patch).await
        }
        ClientRequest::MoveAura {
            shape,
            aura,
            new_shape,
        } => {
            broadcaster
                .move_aura(connection, shape, aura, new_shape)
                .await
        }
        ClientRequest::RemoveAura { shape, aura } => {
            broadcaster.remove_aura(connection, shape, aura).await
        }
        ClientRequest::AddLabel { shape, label } => {
            broadcaster.add_label(connection, shape, label).await
        }
        ClientRequest::RemoveLabel { shape, label } => {
            broadcaster.remove_label(connection, shape, label).await
        }
        ClientRequest::SwitchScene { scene } => {
            state.registry.switch_scene(connection, scene);
            Ok(())
        }
    };

    if let Err(error) = result {
        // Local abort: nothing was broadcast, nothing is echoed back.
        debug!(%connection, %error, "Mutation aborted");
    }
}
