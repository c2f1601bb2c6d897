//! Configuration loading and typed config structures for Pixelboard.
//!
//! The canonical configuration lives in `pixelboard-config.yaml` next to
//! the server binary's working directory. Every field has a default, so
//! omitted sections (or no file at all) yield a working 32x32 canvas with a
//! 5 second cooldown. Configuration is fixed at process start; nothing here
//! supports live reconfiguration.

use std::path::Path;
use std::time::Duration;

use pixelboard_types::{Color, ColorError, MAX_GRID_SIZE};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config: {message}")]
    Invalid {
        /// Which value is unusable and why.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Pixelboard configuration.
///
/// Mirrors the structure of `pixelboard-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PixelboardConfig {
    /// Grid dimension and initial color.
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Per-actor rate limiting.
    #[serde(default)]
    pub cooldown: CooldownConfig,

    /// Observer delivery channels.
    #[serde(default)]
    pub subscribers: SubscriberConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: HttpConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Top-level `gridSize`, folded into [`CanvasConfig::grid_size`].
    #[serde(default, rename = "gridSize")]
    flat_grid_size: Option<u32>,

    /// Top-level `cooldownWindowMs`, folded into
    /// [`CooldownConfig::window_ms`].
    #[serde(default, rename = "cooldownWindowMs")]
    flat_cooldown_window_ms: Option<u64>,
}

impl PixelboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `PIXELBOARD_HOST` overrides `server.host`
    /// - `PIXELBOARD_PORT` overrides `server.port`
    /// - `PIXELBOARD_GRID_SIZE` overrides `canvas.grid_size`
    /// - `PIXELBOARD_COOLDOWN_MS` overrides `cooldown.window_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides and validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.fold_flat_options();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Move the top-level `gridSize` / `cooldownWindowMs` keys into their
    /// sections. A top-level key wins over the nested value.
    const fn fold_flat_options(&mut self) {
        if let Some(size) = self.flat_grid_size.take() {
            self.canvas.grid_size = size;
        }
        if let Some(window_ms) = self.flat_cooldown_window_ms.take() {
            self.cooldown.window_ms = window_ms;
        }
    }

    /// Apply `PIXELBOARD_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric override does not
    /// parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("PIXELBOARD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PIXELBOARD_PORT") {
            self.server.port = parse_override("PIXELBOARD_PORT", &val)?;
        }
        if let Ok(val) = std::env::var("PIXELBOARD_GRID_SIZE") {
            self.canvas.grid_size = parse_override("PIXELBOARD_GRID_SIZE", &val)?;
        }
        if let Ok(val) = std::env::var("PIXELBOARD_COOLDOWN_MS") {
            self.cooldown.window_ms = parse_override("PIXELBOARD_COOLDOWN_MS", &val)?;
        }
        Ok(())
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.grid_size == 0 || self.canvas.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::Invalid {
                message: format!(
                    "canvas.grid_size must be in 1..={MAX_GRID_SIZE}, got {}",
                    self.canvas.grid_size
                ),
            });
        }
        if self.subscribers.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: String::from("subscribers.channel_capacity must be at least 1"),
            });
        }
        self.canvas.default_color().map_err(|e| ConfigError::Invalid {
            message: format!("canvas.default_color: {e}"),
        })?;
        Ok(())
    }
}

fn parse_override<T: core::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e| ConfigError::Invalid {
        message: format!("{name}={raw:?}: {e}"),
    })
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CanvasConfig {
    /// Grid dimension `N`; the canvas holds `N * N` cells.
    #[serde(default = "default_grid_size", alias = "gridSize")]
    pub grid_size: u32,

    /// Color of every cell at startup, `#RRGGBB`.
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl CanvasConfig {
    /// Parse [`default_color`](Self::default_color).
    ///
    /// # Errors
    ///
    /// Returns the [`ColorError`] if the configured value is not a
    /// canonical color.
    pub fn default_color(&self) -> Result<Color, ColorError> {
        Color::parse(&self.default_color)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            default_color: default_color(),
        }
    }
}

/// Cooldown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CooldownConfig {
    /// Minimum milliseconds between two accepted writes from one actor.
    /// Zero disables rate limiting.
    #[serde(default = "default_cooldown_window_ms", alias = "cooldownWindowMs")]
    pub window_ms: u64,

    /// How often expired ledger records are swept, in milliseconds. Zero
    /// disables the sweeper.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl CooldownConfig {
    /// The cooldown window as a [`Duration`].
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// The sweep interval, or `None` when sweeping is disabled.
    pub const fn sweep_interval(&self) -> Option<Duration> {
        if self.sweep_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.sweep_interval_ms))
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            window_ms: default_cooldown_window_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

/// Observer delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriberConfig {
    /// Events buffered per subscriber before it is considered saturated
    /// and disconnected.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Whether structured JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_grid_size() -> u32 {
    32
}

fn default_color() -> String {
    String::from("#FFFFFF")
}

const fn default_cooldown_window_ms() -> u64 {
    5000
}

const fn default_sweep_interval_ms() -> u64 {
    60_000
}

const fn default_channel_capacity() -> usize {
    256
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}
