//! HTTP API for the Pixelboard shared canvas.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Write endpoint** (`POST /api/canvas`) that submits a cell write
//!   through the [`MutationGateway`](pixelboard_core::MutationGateway)
//! - **Snapshot endpoint** (`GET /api/canvas`) returning the full grid
//! - **Server-Sent Events stream** (`GET /api/events`) pushing a
//!   `canvas-state` baseline followed by `pixel-update` events
//! - **`WebSocket` stream** (`GET /ws/canvas`) carrying the same events as
//!   text frames
//! - **Status endpoint** (`GET /api/status`) with live counters
//!
//! # Architecture
//!
//! Handlers hold no state of their own. Every request goes through the
//! shared gateway in [`AppState`]; each stream connection owns one
//! [`Subscriber`](pixelboard_core::Subscriber), so closing the connection
//! drops the subscriber and removes it from the registry.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sse;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{serve, ServerConfig, ServerError};
pub use startup::{spawn_cooldown_sweeper, spawn_server, RunningServer, StartupError};
pub use state::AppState;
