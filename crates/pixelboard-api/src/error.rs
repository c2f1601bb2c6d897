//! Error types for the Pixelboard API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! body carries an `error` name and the numeric `status`; cooldown
//! rejections add `remainingMs` and a `Retry-After` header.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use pixelboard_core::{InvalidRequest, MutationError};
use tracing::error;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The gateway rejected a write.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InvalidRequest> for ApiError {
    fn from(invalid: InvalidRequest) -> Self {
        Self::Mutation(MutationError::Invalid(invalid))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Mutation(MutationError::Invalid(invalid)) => {
                let body = serde_json::json!({
                    "error": "InvalidRequest",
                    "cause": invalid.cause(),
                    "message": invalid.to_string(),
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                });
                (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
            }
            Self::Mutation(err @ MutationError::CooldownActive { .. }) => {
                let remaining_ms = err.remaining_ms().unwrap_or_default();
                let body = serde_json::json!({
                    "error": err.kind(),
                    "remainingMs": remaining_ms,
                    "status": StatusCode::TOO_MANY_REQUESTS.as_u16(),
                });
                let retry_after = HeaderValue::from(remaining_ms.div_ceil(1000));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after)],
                    axum::Json(body),
                )
                    .into_response()
            }
            Self::Mutation(err @ MutationError::Internal(_)) => {
                error!(error = %err, "write failed with internal inconsistency");
                internal(err.kind(), &err.to_string())
            }
            Self::Serialization(e) => {
                error!(error = %e, "response serialization failed");
                internal("InternalInconsistency", &format!("JSON error: {e}"))
            }
        }
    }
}

fn internal(kind: &str, message: &str) -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = serde_json::json!({
        "error": kind,
        "message": message,
        "status": status.as_u16(),
    });
    (status, axum::Json(body)).into_response()
}
