//! `WebSocket` stream of canvas updates.
//!
//! Clients connect to `GET /ws/canvas` and receive a JSON-encoded
//! [`StreamEvent`](pixelboard_types::StreamEvent) text frame for the
//! baseline snapshot and for every committed write after it. Unlike a
//! lossy broadcast channel, a client that falls too far behind is not
//! skipped ahead: the registry drops it and the socket is closed, so a
//! client either sees every event in order or knows it must reconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming canvas events.
///
/// # Route
///
/// `GET /ws/canvas`
pub async fn ws_canvas(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: subscribe through the gateway and
/// forward each event as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscriber = state.gateway.subscribe().await;
    debug!(subscriber = %subscriber.id(), "WebSocket client connected");

    loop {
        tokio::select! {
            // Receive the next event for this subscriber.
            next = subscriber.recv() => {
                let Some(event) = next else {
                    debug!(subscriber = %subscriber.id(), "subscriber dropped by registry, closing");
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                };
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(error = %e, subscriber = %subscriber.id(), "failed to serialize stream event");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %subscriber.id(), "WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %subscriber.id(), "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %subscriber.id(), "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, subscriber = %subscriber.id(), "WebSocket error");
                        return;
                    }
                    _ => {
                        // Clients do not send commands over this socket.
                    }
                }
            }
        }
    }
}
