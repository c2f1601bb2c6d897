//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/canvas` | Write one cell |
//! | `GET` | `/api/canvas` | Full grid snapshot |
//! | `GET` | `/api/status` | Live counters |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use pixelboard_core::{InvalidRequest, MutationRequest};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/canvas`.
#[derive(Debug, Deserialize)]
pub struct WriteBody {
    /// Opaque actor token. `userId` is accepted as an alias.
    #[serde(rename = "actorId", alias = "userId", default)]
    pub actor_id: Option<String>,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Requested color, `#RRGGBB`.
    pub color: String,
}

impl From<WriteBody> for MutationRequest {
    fn from(body: WriteBody) -> Self {
        Self {
            actor: body.actor_id,
            x: body.x,
            y: body.y,
            color: body.color,
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/canvas -- write one cell
// ---------------------------------------------------------------------------

/// Submit a cell write.
///
/// Returns `{success: true, cell: {x, y, color}, sequence}` on success. A
/// body that does not decode (missing field, non-integer coordinate) is an
/// `InvalidRequest`, the same as a semantically invalid one.
pub async fn write_cell(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WriteBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| InvalidRequest::Malformed(e.body_text()))?;
    let request = MutationRequest::from(body);
    let outcome = state.gateway.submit(&request).await?;

    info!(
        x = outcome.cell.x,
        y = outcome.cell.y,
        color = %outcome.cell.color,
        sequence = outcome.sequence,
        delivered = outcome.delivered,
        "cell written"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "cell": outcome.cell,
        "sequence": outcome.sequence,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/canvas -- full grid snapshot
// ---------------------------------------------------------------------------

/// Return the current grid as rows of colors (`canvas[y][x]`).
pub async fn get_canvas(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.gateway.snapshot().await;
    Ok(Json(serde_json::json!({
        "canvas": serde_json::to_value(&snapshot.data)?,
        "size": snapshot.size,
        "sequence": snapshot.sequence,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/status -- live counters
// ---------------------------------------------------------------------------

/// Return grid size, cooldown window, subscriber and actor counts and the
/// last committed sequence number.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.gateway.status().await)
}
