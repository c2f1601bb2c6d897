//! The single admission and commit path for grid writes.
//!
//! A request moves through `validate -> check -> apply -> record ->
//! sequence -> publish`. Validation needs no shared state and runs before
//! any lock is taken. Everything after it runs inside the commit region
//! (`commit` mutex), which gives three guarantees at once:
//!
//! - two requests from the same actor can never both pass the cooldown
//!   check before one of them records;
//! - sequence numbers are assigned in commit order with no gaps;
//! - events reach the broadcaster in sequence order.
//!
//! The region never awaits a subscriber (fan-out is `try_send` only) and
//! has no await point between the grid write and the publish, so a write
//! that touched the grid is always published even if the calling task is
//! cancelled.
//!
//! New subscribers join inside the same region, so the baseline snapshot
//! they receive is exactly the state after the last published event.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pixelboard_types::{
    ActorId, ActorIdError, CanvasStateEvent, CellView, Color, Coord, MutationEvent, StreamEvent,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::broadcast::Broadcaster;
use crate::clock::Clock;
use crate::config::PixelboardConfig;
use crate::cooldown::CooldownLedger;
use crate::error::{ceil_millis, GatewayError, GridError, InvalidRequest, MutationError};
use crate::grid::GridStore;
use crate::registry::{Subscriber, SubscriptionRegistry};

/// A proposed write, as received from a caller.
///
/// Fields are kept raw so that every structural problem surfaces as an
/// [`InvalidRequest`] from the gateway rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    /// Opaque actor token; `None` when the caller sent none.
    pub actor: Option<String>,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Requested color, `#RRGGBB`.
    pub color: String,
}

impl MutationRequest {
    /// Convenience constructor for a request with an actor.
    pub fn new(actor: impl Into<String>, x: i64, y: i64, color: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
            x,
            y,
            color: color.into(),
        }
    }
}

/// A request that passed structural validation.
#[derive(Debug)]
struct ValidatedMutation {
    actor: ActorId,
    coord: Coord,
    color: Color,
}

/// A committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The cell as stored.
    pub cell: CellView,
    /// The write's position in the commit order.
    pub sequence: u64,
    /// Subscribers the event was handed to.
    pub delivered: usize,
}

/// Point-in-time counters for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatewayStatus {
    /// Grid dimension.
    pub grid_size: u32,
    /// Cooldown window in milliseconds.
    pub cooldown_window_ms: u64,
    /// Connected subscribers.
    pub subscribers: usize,
    /// Actors with a cooldown record.
    pub tracked_actors: usize,
    /// Sequence number of the last committed write, `0` if none.
    pub last_sequence: u64,
}

/// State guarded by the commit region.
#[derive(Debug, Default)]
struct CommitState {
    last_sequence: u64,
}

/// Orchestrates admission, commit and fan-out.
#[derive(Debug)]
pub struct MutationGateway {
    grid: GridStore,
    ledger: CooldownLedger,
    registry: Arc<SubscriptionRegistry>,
    broadcaster: Broadcaster,
    clock: Arc<dyn Clock>,
    commit: Mutex<CommitState>,
}

impl MutationGateway {
    /// Assemble a gateway from its components.
    pub fn new(
        grid: GridStore,
        ledger: CooldownLedger,
        registry: Arc<SubscriptionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        Self {
            grid,
            ledger,
            registry,
            broadcaster,
            clock,
            commit: Mutex::new(CommitState::default()),
        }
    }

    /// Build every component from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the configuration fails
    /// validation, or [`GatewayError::Grid`] if the grid cannot be built.
    pub fn from_config(
        config: &PixelboardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let fill = config.canvas.default_color().map_err(GridError::from)?;
        let grid = GridStore::new(config.canvas.grid_size, fill)?;
        let ledger = CooldownLedger::new(config.cooldown.window());
        let registry = Arc::new(SubscriptionRegistry::new(
            config.subscribers.channel_capacity,
        ));
        info!(
            grid_size = config.canvas.grid_size,
            cooldown_window_ms = config.cooldown.window_ms,
            channel_capacity = config.subscribers.channel_capacity,
            "mutation gateway initialized"
        );
        Ok(Self::new(grid, ledger, registry, clock))
    }

    /// The grid store.
    pub const fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// The cooldown ledger.
    pub const fn ledger(&self) -> &CooldownLedger {
        &self.ledger
    }

    /// The subscriber registry.
    pub const fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Submit a write at the clock's current time.
    ///
    /// # Errors
    ///
    /// See [`submit_at`](Self::submit_at).
    pub async fn submit(&self, request: &MutationRequest) -> Result<MutationOutcome, MutationError> {
        let now = self.clock.now();
        self.submit_at(request, now).await
    }

    /// Submit a write as of `now`.
    ///
    /// The same `now` is used for the cooldown check and the cooldown
    /// record.
    ///
    /// # Errors
    ///
    /// - [`MutationError::Invalid`] for a missing actor, out-of-range
    ///   coordinate or malformed color. Nothing is touched.
    /// - [`MutationError::CooldownActive`] if the actor's window has not
    ///   elapsed. Nothing is touched and nothing is recorded.
    /// - [`MutationError::Internal`] if the grid rejects an already
    ///   validated write or the sequence counter is exhausted.
    pub async fn submit_at(
        &self,
        request: &MutationRequest,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, MutationError> {
        let mutation = self.validate(request).inspect_err(|e| {
            debug!(error = %e, "write rejected by validation");
        })?;

        let mut commit = self.commit.lock().await;

        let remaining = self.ledger.check(&mutation.actor, now);
        if !remaining.is_zero() {
            debug!(
                actor = %mutation.actor,
                remaining_ms = ceil_millis(remaining),
                "write rejected by cooldown"
            );
            return Err(MutationError::CooldownActive { remaining });
        }

        let sequence = commit.last_sequence.checked_add(1).ok_or_else(|| {
            error!(last_sequence = commit.last_sequence, "sequence counter exhausted");
            MutationError::Internal(String::from("sequence counter exhausted"))
        })?;

        let stored = self
            .grid
            .apply(mutation.coord, mutation.color)
            .await
            .map_err(|e| {
                error!(error = %e, "validated write rejected by grid");
                MutationError::Internal(format!("validated write rejected by grid: {e}"))
            })?;

        // No await point from here to the end of the region.
        self.ledger.record(&mutation.actor, now);
        commit.last_sequence = sequence;
        let event = MutationEvent::new(mutation.coord, stored, sequence);
        let report = self.broadcaster.publish(&event);
        drop(commit);

        debug!(
            actor = %mutation.actor,
            x = event.x,
            y = event.y,
            color = %stored,
            sequence,
            delivered = report.delivered,
            dropped = report.dropped,
            "write committed"
        );

        Ok(MutationOutcome {
            cell: event.cell(),
            sequence,
            delivered: report.delivered,
        })
    }

    /// Register a new observer.
    ///
    /// The returned [`Subscriber`] yields a [`StreamEvent::CanvasState`]
    /// first, then every write committed after it, in order.
    pub async fn subscribe(&self) -> Subscriber {
        let commit = self.commit.lock().await;
        let grid = self.grid.snapshot().await;
        let baseline =
            StreamEvent::CanvasState(CanvasStateEvent::from_grid(&grid, commit.last_sequence));
        let subscriber = self.registry.join_with_baseline(baseline);
        drop(commit);
        info!(
            subscriber = %subscriber.id(),
            subscribers = self.registry.len(),
            "observer subscribed"
        );
        subscriber
    }

    /// A consistent copy of the grid tagged with the last committed
    /// sequence number.
    pub async fn snapshot(&self) -> CanvasStateEvent {
        let commit = self.commit.lock().await;
        let grid = self.grid.snapshot().await;
        CanvasStateEvent::from_grid(&grid, commit.last_sequence)
    }

    /// Current counters.
    pub async fn status(&self) -> GatewayStatus {
        let last_sequence = self.commit.lock().await.last_sequence;
        GatewayStatus {
            grid_size: self.grid.size(),
            cooldown_window_ms: ceil_millis(self.ledger.window()),
            subscribers: self.registry.len(),
            tracked_actors: self.ledger.tracked_actors(),
            last_sequence,
        }
    }

    /// Drop cooldown records that can no longer affect admission.
    pub fn evict_expired_cooldowns(&self) -> usize {
        let evicted = self.ledger.evict_expired(self.clock.now());
        if evicted > 0 {
            debug!(evicted, remaining = self.ledger.tracked_actors(), "cooldown records evicted");
        }
        evicted
    }

    /// The configured cooldown window.
    pub const fn cooldown_window(&self) -> Duration {
        self.ledger.window()
    }

    fn validate(&self, request: &MutationRequest) -> Result<ValidatedMutation, InvalidRequest> {
        let actor = ActorId::new(request.actor.as_deref().ok_or(ActorIdError::Empty)?)?;
        let coord = self
            .grid
            .resolve(request.x, request.y)
            .map_err(|_bounds| InvalidRequest::OutOfBounds {
                x: request.x,
                y: request.y,
                size: self.grid.size(),
            })?;
        let color = Color::parse(&request.color)?;
        Ok(ValidatedMutation {
            actor,
            coord,
            color,
        })
    }
}
