//! Live observer membership.
//!
//! The registry is an arena of delivery handles keyed by [`SubscriberId`].
//! Each member owns a bounded [`mpsc`] channel: the registry keeps the
//! sending half, the [`Subscriber`] returned by [`SubscriptionRegistry::join`]
//! keeps the receiving half. Join and leave are the only mutations.
//! Publishers iterate over a copy taken by
//! [`SubscriptionRegistry::active_subscribers`], so membership can change
//! freely while a fan-out pass is in flight.
//!
//! Dropping a [`Subscriber`] leaves the registry, so a cancelled stream
//! task releases its slot without any extra bookkeeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use pixelboard_types::{StreamEvent, SubscriberId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

/// A point-in-time view of one registered subscriber.
#[derive(Debug, Clone)]
pub struct Member {
    /// The subscriber's connection identity.
    pub id: SubscriberId,
    /// Sending half of its delivery channel.
    pub handle: mpsc::Sender<StreamEvent>,
}

/// The set of currently connected observers.
#[derive(Debug)]
pub struct SubscriptionRegistry {
    capacity: usize,
    members: Mutex<HashMap<SubscriberId, mpsc::Sender<StreamEvent>>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry whose delivery channels buffer up to
    /// `capacity` events each (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            members: Mutex::new(HashMap::new()),
        }
    }

    /// Per-subscriber channel capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register a new subscriber with a fresh delivery channel.
    pub fn join(self: &Arc<Self>) -> Subscriber {
        self.register(None)
    }

    /// Register a new subscriber whose first received event is `baseline`,
    /// ahead of anything published after this call returns.
    pub fn join_with_baseline(self: &Arc<Self>, baseline: StreamEvent) -> Subscriber {
        self.register(Some(baseline))
    }

    /// Remove a subscriber.
    ///
    /// Idempotent: returns `true` if `id` was a member, `false` otherwise.
    pub fn leave(&self, id: SubscriberId) -> bool {
        let removed = self.members().remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "subscriber left");
        }
        removed
    }

    /// Copy of the current membership for one fan-out pass.
    pub fn active_subscribers(&self) -> Vec<Member> {
        self.members()
            .iter()
            .map(|(id, handle)| Member {
                id: *id,
                handle: handle.clone(),
            })
            .collect()
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.members().contains_key(&id)
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.members().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    fn register(self: &Arc<Self>, baseline: Option<StreamEvent>) -> Subscriber {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriberId::new();
        self.members().insert(id, tx);
        debug!(subscriber = %id, "subscriber joined");
        Subscriber {
            id,
            baseline,
            receiver: rx,
            registry: Arc::downgrade(self),
        }
    }

    // Membership entries are independent; a poisoned map is still coherent.
    fn members(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<StreamEvent>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One live observer's end of the stream.
///
/// Yields the baseline (if any) first, then every event the broadcaster
/// enqueued, in order. Returns `None` once the registry has dropped this
/// member (saturated or closed) and the buffered events are drained.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    baseline: Option<StreamEvent>,
    receiver: mpsc::Receiver<StreamEvent>,
    registry: Weak<SubscriptionRegistry>,
}

impl Subscriber {
    /// Connection-scoped identity.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        if let Some(first) = self.baseline.take() {
            return Some(first);
        }
        self.receiver.recv().await
    }

    /// Take the next event if one is ready.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] if nothing is buffered, or
    /// [`TryRecvError::Disconnected`] once the registry dropped this member
    /// and the buffer is drained.
    pub fn try_recv(&mut self) -> Result<StreamEvent, TryRecvError> {
        if let Some(first) = self.baseline.take() {
            return Ok(first);
        }
        self.receiver.try_recv()
    }

    /// Leave the registry explicitly. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.leave(self.id);
        }
    }
}
