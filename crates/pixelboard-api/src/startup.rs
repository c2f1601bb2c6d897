//! Background task helpers for the server binary.
//!
//! [`spawn_server`] launches the HTTP server on a Tokio task after binding
//! its listener eagerly, so a port conflict is reported to the caller
//! instead of being logged from inside the task. [`spawn_cooldown_sweeper`]
//! periodically drops cooldown records whose window has elapsed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixelboard_api::{spawn_server, AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::from_config(&config)?);
//! let running = spawn_server(&ServerConfig::from(&config.server), state).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pixelboard_core::MutationGateway;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct RunningServer {
    /// The address actually bound (resolves port `0`).
    pub addr: SocketAddr,
    /// Handle to the serving task.
    pub handle: JoinHandle<()>,
}

/// Bind the configured address and serve the API on a background task.
///
/// The server runs until the Tokio runtime is shut down or the task is
/// aborted. The caller should hold the returned handle and abort or
/// await it during shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or cannot
/// be bound.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<RunningServer, StartupError> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state).await {
            tracing::error!(error = %e, "Pixelboard server exited with error");
        }
    });

    tracing::info!(%addr, "Pixelboard server spawned on background task");

    Ok(RunningServer { addr, handle })
}

/// Evict expired cooldown records every `interval`.
///
/// Eviction only removes records that can no longer cause a rejection,
/// so the sweeper never changes an admission decision.
pub fn spawn_cooldown_sweeper(gateway: Arc<MutationGateway>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = gateway.evict_expired_cooldowns();
            tracing::trace!(evicted, "cooldown sweep");
        }
    })
}
