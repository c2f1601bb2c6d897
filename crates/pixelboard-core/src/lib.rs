//! Authoritative shared-state and fan-out engine for the Pixelboard canvas.
//!
//! This crate owns the single source of truth for the grid, admits writes
//! under a per-actor cooldown, and pushes every accepted write to all live
//! observers in commit order.
//!
//! # Modules
//!
//! - [`grid`] -- [`GridStore`], the lock-guarded grid of cell colors
//! - [`cooldown`] -- [`CooldownLedger`], last-accepted timestamps per actor
//! - [`registry`] -- [`SubscriptionRegistry`] and the [`Subscriber`] handle
//! - [`broadcast`] -- [`Broadcaster`], non-blocking fan-out to subscribers
//! - [`gateway`] -- [`MutationGateway`], the single admission and commit path
//! - [`clock`] -- Injectable time source
//! - [`config`] -- Configuration loading from `pixelboard-config.yaml`
//! - [`error`] -- Request and component error types
//!
//! # Architecture
//!
//! Writes enter through [`MutationGateway::submit`]. Validation happens
//! outside any lock. The cooldown check, grid write, cooldown record,
//! sequence assignment and fan-out then run inside one commit region, so
//! commit order, sequence order and delivery order are the same order.
//! Fan-out only ever uses `try_send` on bounded per-subscriber channels, so
//! a slow observer can never hold the commit region; it is dropped instead.

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod gateway;
pub mod grid;
pub mod registry;

pub use broadcast::{Broadcaster, DeliveryFailure, PublishReport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, PixelboardConfig};
pub use cooldown::{CooldownLedger, CooldownRecord};
pub use error::{GatewayError, GridError, InvalidRequest, MutationError};
pub use gateway::{GatewayStatus, MutationGateway, MutationOutcome, MutationRequest};
pub use grid::GridStore;
pub use registry::{Member, Subscriber, SubscriptionRegistry};
