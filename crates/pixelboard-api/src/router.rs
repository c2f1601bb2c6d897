//! Axum router construction for the Pixelboard API.
//!
//! Assembles all routes (REST, SSE and `WebSocket`) into a single
//! [`Router`] with CORS middleware enabled for browser clients served
//! from another origin.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Pixelboard server.
///
/// The router includes:
/// - `GET /api/canvas` -- full grid snapshot
/// - `POST /api/canvas` -- write one cell
/// - `GET /api/events` -- Server-Sent Events stream
/// - `GET /ws/canvas` -- `WebSocket` event stream
/// - `GET /api/status` -- live counters
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // REST API
        .route(
            "/api/canvas",
            get(handlers::get_canvas).post(handlers::write_cell),
        )
        .route("/api/status", get(handlers::get_status))
        // Streams
        .route("/api/events", get(sse::sse_events))
        .route("/ws/canvas", get(ws::ws_canvas))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
