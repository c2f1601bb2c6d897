//! Error types for the Pixelboard core.
//!
//! Request-scoped failures ([`InvalidRequest`], cooldown rejections) are
//! returned to the writer and never leave partial state behind.
//! [`MutationError::Internal`] marks a broken internal invariant; it is
//! logged where it is detected and surfaced to the caller, never swallowed.
//! Per-subscriber delivery failures live in [`crate::broadcast`] and never
//! reach this module's types.

use std::time::Duration;

use pixelboard_types::{ActorIdError, ColorError};

use crate::config::ConfigError;

/// Errors from [`GridStore`](crate::grid::GridStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A coordinate lies outside `[0, size)`.
    #[error("({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Grid dimension.
        size: u32,
    },

    /// The color is not a canonical `#RRGGBB` value.
    #[error("invalid color: {0}")]
    InvalidColor(#[from] ColorError),

    /// The grid cannot be built with this dimension.
    #[error("unsupported grid size {size}")]
    InvalidSize {
        /// The rejected dimension.
        size: u32,
    },
}

/// Why a write request failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    /// The actor identity is missing, blank or oversized.
    #[error("{0}")]
    Actor(#[from] ActorIdError),

    /// The coordinate lies outside the grid.
    #[error("({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Grid dimension.
        size: u32,
    },

    /// The color is not a canonical `#RRGGBB` value.
    #[error("invalid color: {0}")]
    Color(#[from] ColorError),

    /// The request body could not be decoded at all.
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl InvalidRequest {
    /// Short machine-readable cause for response bodies.
    pub const fn cause(&self) -> &'static str {
        match self {
            Self::Actor(_) => "actor",
            Self::OutOfBounds { .. } => "coordinate",
            Self::Color(_) => "color",
            Self::Malformed(_) => "body",
        }
    }
}

/// Outcome of a rejected write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The request was structurally invalid; nothing was touched.
    #[error("invalid request: {0}")]
    Invalid(#[from] InvalidRequest),

    /// The actor must wait `remaining` before its next write is admitted.
    #[error("cooldown active, {}ms remaining", .remaining.as_millis())]
    CooldownActive {
        /// Time until the actor's window elapses.
        remaining: Duration,
    },

    /// An internal invariant was violated while committing.
    #[error("internal inconsistency: {0}")]
    Internal(String),
}

impl MutationError {
    /// Error name used on the wire.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "InvalidRequest",
            Self::CooldownActive { .. } => "CooldownActive",
            Self::Internal(_) => "InternalInconsistency",
        }
    }

    /// Remaining cooldown in whole milliseconds, rounded up so that any
    /// positive wait is reported as at least `1`. `None` for other errors.
    pub fn remaining_ms(&self) -> Option<u64> {
        match self {
            Self::CooldownActive { remaining } => Some(ceil_millis(*remaining)),
            Self::Invalid(_) | Self::Internal(_) => None,
        }
    }
}

/// Round a duration up to whole milliseconds.
pub fn ceil_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

/// Errors building a [`MutationGateway`](crate::gateway::MutationGateway).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The grid could not be created.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// The configuration is unusable.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
