//! Pixelboard server binary.
//!
//! Loads configuration, initializes logging, builds the mutation gateway
//! and serves the HTTP API until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `PIXELBOARD_CONFIG` or
//!    `pixelboard-config.yaml`, falling back to defaults
//! 2. Initialize structured logging (tracing)
//! 3. Build the gateway (grid, cooldown ledger, subscriber registry)
//! 4. Start the cooldown sweeper
//! 5. Bind and serve the API
//! 6. Wait for `Ctrl-C` or server exit

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use pixelboard_api::{spawn_cooldown_sweeper, spawn_server, AppState, ServerConfig};
use pixelboard_core::config::LoggingConfig;
use pixelboard_core::PixelboardConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerBinError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "pixelboard-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup or the server task fails.
#[tokio::main]
async fn main() -> Result<(), ServerBinError> {
    // 1. Load configuration. Logging is not up yet, so report the source
    //    once the subscriber is installed.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("pixelboard-server starting");
    info!(
        source = %source,
        grid_size = config.canvas.grid_size,
        cooldown_window_ms = config.cooldown.window_ms,
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // 3. Build the gateway.
    let state = Arc::new(AppState::from_config(&config)?);

    // 4. Start the cooldown sweeper.
    let sweeper = config.cooldown.sweep_interval().map(|interval| {
        info!(interval_ms = config.cooldown.sweep_interval_ms, "Cooldown sweeper started");
        spawn_cooldown_sweeper(Arc::clone(&state.gateway), interval)
    });

    // 5. Bind and serve.
    let running = spawn_server(&ServerConfig::from(&config.server), Arc::clone(&state)).await?;
    info!(addr = %running.addr, "Pixelboard API server started");

    // 6. Run until Ctrl-C or the server task ends. Open event streams never
    //    finish on their own, so shutdown aborts the task rather than
    //    draining connections.
    let mut handle = running.handle;
    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received");
            handle.abort();
            Ok(())
        }
        joined = &mut handle => {
            joined.map_err(|e| ServerBinError::ServerTask { message: format!("{e}") })
        }
    };

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("pixelboard-server stopped");
    result
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration from `PIXELBOARD_CONFIG` or the default path.
///
/// A missing file at the default path means defaults; a missing file
/// named by `PIXELBOARD_CONFIG` is an error. Environment overrides apply
/// in both cases.
fn load_config() -> Result<(PixelboardConfig, String), ServerBinError> {
    if let Ok(path) = std::env::var("PIXELBOARD_CONFIG") {
        let path = PathBuf::from(path);
        let config = PixelboardConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = PixelboardConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = PixelboardConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, String::from("defaults")))
    }
}
