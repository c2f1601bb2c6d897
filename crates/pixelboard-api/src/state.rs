//! Shared application state for the API server.
//!
//! [`AppState`] is a thin handle on the [`MutationGateway`]: the gateway
//! owns the grid, the cooldown ledger and the subscriber registry, and
//! already serializes access to them, so the API layer adds no locks of
//! its own.

use std::sync::Arc;

use pixelboard_core::{Clock, GatewayError, MutationGateway, PixelboardConfig, SystemClock};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single admission and commit path.
    pub gateway: Arc<MutationGateway>,
}

impl AppState {
    /// Wrap an existing gateway.
    pub const fn new(gateway: Arc<MutationGateway>) -> Self {
        Self { gateway }
    }

    /// Build a gateway from configuration using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the configuration is unusable.
    pub fn from_config(config: &PixelboardConfig) -> Result<Self, GatewayError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Build a gateway from configuration with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the configuration is unusable.
    pub fn from_config_with_clock(
        config: &PixelboardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        let gateway = MutationGateway::from_config(config, clock)?;
        Ok(Self::new(Arc::new(gateway)))
    }
}
