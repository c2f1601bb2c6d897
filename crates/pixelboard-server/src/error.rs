//! Error types for the server binary.
//!
//! [`ServerBinError`] wraps every failure mode during startup and
//! shutdown so `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerBinError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pixelboard_core::ConfigError,
    },

    /// The gateway could not be built from configuration.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying gateway error.
        #[from]
        source: pixelboard_core::GatewayError,
    },

    /// The HTTP server failed to start.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: pixelboard_api::StartupError,
    },

    /// The serving task panicked or was cancelled.
    #[error("server task failed: {message}")]
    ServerTask {
        /// Description of the task failure.
        message: String,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
