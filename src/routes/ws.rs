//! WebSocket handler for the status link.
//!
//! DESIGN
//! ======
//! On upgrade, registers the client with [`AppState`] and enters a
//! `select!` loop:
//! - Incoming client frames → acknowledge (or reject) back to the sender
//! - Feed events from the broadcast task → forward to the client
//!
//! Frame handling is kept apart from the transport so tests can exercise the
//! acknowledgement rules without a socket.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send a `log` event "connected" carrying the `client_id`
//! 2. Client frames → `log` ack echoing the payload, or an `error` event
//! 3. Close → unregister

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use frames::{ModuleTag, StatusEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

/// Outbound frame encoding chosen by the client at upgrade time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
    Protobuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    encoding: Encoding,
}

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state, params.encoding))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, encoding: Encoding) {
    let (client_id, mut client_rx) = state.register().await;
    let task_id = state.config.task_id.clone();

    let welcome = StatusEvent::log(ModuleTag::default(), task_id.as_str(), "connected")
        .with_detail("client_id", client_id.to_string());
    if send_event(&mut socket, encoding, &welcome).await.is_err() {
        state.unregister(client_id).await;
        return;
    }

    info!(%client_id, ?encoding, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                let reply = match msg {
                    Message::Text(text) => process_inbound_text(client_id, &task_id, text.as_str()),
                    Message::Binary(bytes) => process_inbound_binary(client_id, &task_id, &bytes),
                    Message::Close(_) => break,
                    _ => continue,
                };
                if send_event(&mut socket, encoding, &reply).await.is_err() {
                    break;
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, encoding, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    state.unregister(client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// INBOUND
// =============================================================================

/// Acknowledge one inbound text frame. Any JSON value is accepted and echoed;
/// malformed JSON yields an `error` event.
fn process_inbound_text(client_id: Uuid, task_id: &str, text: &str) -> StatusEvent {
    match serde_json::from_str::<Value>(text) {
        Ok(payload) => {
            info!(%client_id, bytes = text.len(), "ws: recv text frame");
            ack(task_id, payload)
        }
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            StatusEvent::error(ModuleTag::default(), task_id, format!("invalid json: {e}"))
        }
    }
}

/// Acknowledge one inbound protobuf frame.
fn process_inbound_binary(client_id: Uuid, task_id: &str, bytes: &[u8]) -> StatusEvent {
    let decoded = frames::decode_event(bytes).and_then(|event| Ok(serde_json::to_value(event)?));
    match decoded {
        Ok(payload) => {
            info!(%client_id, bytes = bytes.len(), "ws: recv binary frame");
            ack(task_id, payload)
        }
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound binary frame");
            StatusEvent::error(ModuleTag::default(), task_id, format!("invalid frame: {e}"))
        }
    }
}

fn ack(task_id: &str, payload: Value) -> StatusEvent {
    StatusEvent::log(ModuleTag::default(), task_id, "ack").with_detail("echo", payload)
}

// =============================================================================
// OUTBOUND
// =============================================================================

async fn send_event(socket: &mut WebSocket, encoding: Encoding, event: &StatusEvent) -> Result<(), ()> {
    let message = match encoding {
        Encoding::Json => match frames::encode_json(event) {
            Ok(json) => Message::Text(json.into()),
            Err(e) => {
                warn!(error = %e, "ws: failed to serialize event");
                return Err(());
            }
        },
        Encoding::Protobuf => Message::Binary(frames::encode_event(event).into()),
    };

    debug!(kind = event.kind.as_str(), task_id = event.task_id(), "ws: send event");
    socket.send(message).await.map_err(|e| {
        warn!(error = %e, "ws: send failed");
    })
}
