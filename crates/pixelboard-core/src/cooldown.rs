//! Per-actor cooldown ledger.
//!
//! The ledger remembers, for each [`ActorId`], when its last write was
//! accepted. [`CooldownLedger::check`] is a pure read and
//! [`CooldownLedger::record`] is only called after a write has been applied
//! to the grid. Atomicity of check-then-record for one actor is provided by
//! the gateway's commit region, not by this type.
//!
//! Records whose window has fully elapsed are indistinguishable from absent
//! ones, so [`CooldownLedger::evict_expired`] can drop them at any time
//! without changing an admission decision.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pixelboard_types::ActorId;

/// The last accepted write for one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownRecord {
    /// Whose write it was.
    pub actor: ActorId,
    /// When it was accepted.
    pub last_accepted: DateTime<Utc>,
}

/// Last-accepted timestamps keyed by actor.
#[derive(Debug)]
pub struct CooldownLedger {
    window: Duration,
    records: Mutex<HashMap<ActorId, DateTime<Utc>>>,
}

impl CooldownLedger {
    /// Create an empty ledger with a fixed cooldown `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// The cooldown window shared by all actors.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Time `actor` must still wait at `now`.
    ///
    /// Returns [`Duration::ZERO`] for unknown actors and for actors whose
    /// window has elapsed. If the clock has stepped backwards past the last
    /// record, the wait is capped at one full window.
    pub fn check(&self, actor: &ActorId, now: DateTime<Utc>) -> Duration {
        self.records()
            .get(actor)
            .map_or(Duration::ZERO, |last| self.remaining(*last, now))
    }

    /// Record an accepted write by `actor` at `now`.
    pub fn record(&self, actor: &ActorId, now: DateTime<Utc>) {
        self.records().insert(actor.clone(), now);
    }

    /// The stored record for `actor`, if any.
    pub fn get(&self, actor: &ActorId) -> Option<CooldownRecord> {
        self.records().get(actor).map(|last| CooldownRecord {
            actor: actor.clone(),
            last_accepted: *last,
        })
    }

    /// Drop every record whose window has elapsed at `now`.
    ///
    /// Returns the number of records removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, last| !self.remaining(*last, now).is_zero());
        before.saturating_sub(records.len())
    }

    /// Number of actors currently tracked.
    pub fn tracked_actors(&self) -> usize {
        self.records().len()
    }

    fn remaining(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let window = TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX);
        let Some(ready_at) = last.checked_add_signed(window) else {
            return self.window;
        };
        // `to_std` fails for negative deltas, i.e. the window has elapsed.
        ready_at
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .min(self.window)
    }

    // The map has no cross-entry invariant a panicking holder could break.
    fn records(&self) -> MutexGuard<'_, HashMap<ActorId, DateTime<Utc>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
