//! Server-Sent Events stream of canvas updates.
//!
//! Clients connect to `GET /api/events` and receive one `data:` frame per
//! [`StreamEvent`]: the `canvas-state` baseline first, then a
//! `pixel-update` for every committed write. When the client goes away the
//! response stream is dropped, which drops its
//! [`Subscriber`](pixelboard_core::Subscriber) and removes it from the
//! registry.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use pixelboard_types::StreamEvent;
use tracing::debug;

use crate::state::AppState;

/// Open an event stream for one observer.
///
/// # Route
///
/// `GET /api/events`
pub async fn sse_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscriber = state.gateway.subscribe().await;
    debug!(subscriber = %subscriber.id(), "SSE client connected");

    let events = stream::unfold(subscriber, |mut subscriber| async move {
        let Some(event) = subscriber.recv().await else {
            debug!(subscriber = %subscriber.id(), "SSE subscriber dropped by registry");
            return None;
        };
        Some((to_sse(&event), subscriber))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &StreamEvent) -> Result<Event, axum::Error> {
    Event::default().json_data(event)
}
