//! WebSocket subscription endpoint.
//!
//! A socket joins exactly one session's channel and receives that
//! session's events as JSON text frames. Delivery is best-effort: a
//! lagging socket skips the missed events and keeps going.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use telemetry::metrics;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::notify::{Notifier, SessionEvent};
use crate::response::ApiError;
use crate::state::AppState;

/// GET /sessions/:id/ws - Subscribe to a session's event stream.
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    // Reject subscriptions to sessions that do not exist (or expired).
    if state.store.get(&id).await.map_err(ApiError::from)?.is_none() {
        return Err(ApiError::not_found(format!("session {id} not found")));
    }

    let rx = state.notifier.subscribe(&id);
    let notifier = state.notifier.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, rx, notifier)))
}

async fn handle_socket(
    mut socket: WebSocket,
    session_id: String,
    mut rx: broadcast::Receiver<SessionEvent>,
    notifier: Notifier,
) {
    metrics().ws_connections.inc();
    debug!(session_id = %session_id, "WebSocket subscribed");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(session_id = %session_id, error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %session_id, skipped, "Socket lagged, events skipped");
                }
                Err(RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                // Inbound frames are ignored; the socket is a one-way feed.
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    metrics().ws_connections.dec();
    // Last subscriber out drops the session's channel.
    drop(rx);
    notifier.release(&session_id);
    debug!(session_id = %session_id, "WebSocket disconnected");
}
