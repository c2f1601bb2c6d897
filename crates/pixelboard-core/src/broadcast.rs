//! Fan-out of committed writes to every live subscriber.
//!
//! [`Broadcaster::publish`] never waits on a subscriber. Each delivery is a
//! `try_send` into that subscriber's bounded channel; a full channel means
//! the observer cannot keep up and a closed one means it is gone. Either
//! way the subscriber is removed from the registry and the pass continues
//! with the others. Delivery failures are local to one subscriber and are
//! never reported to the writer.

use std::sync::Arc;

use pixelboard_types::{MutationEvent, StreamEvent, SubscriberId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::registry::SubscriptionRegistry;

/// Why an event could not be handed to one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailure {
    /// The subscriber's buffer is full; it is not draining fast enough.
    #[error("subscriber channel saturated")]
    Saturated,

    /// The subscriber's receiving end has been dropped.
    #[error("subscriber channel closed")]
    Closed,
}

/// Result of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers that accepted the event.
    pub delivered: usize,
    /// Subscribers removed because delivery failed.
    pub dropped: usize,
}

/// Delivers committed writes to the registry's current members.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<SubscriptionRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over `registry`.
    pub const fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Hand `event` to every current subscriber.
    ///
    /// Callers must publish events in sequence order; each channel is FIFO,
    /// so every subscriber then observes them in that order. Never fails as
    /// a whole.
    pub fn publish(&self, event: &MutationEvent) -> PublishReport {
        let mut report = PublishReport::default();
        let mut failed: Vec<(SubscriberId, DeliveryFailure)> = Vec::new();

        for member in self.registry.active_subscribers() {
            match deliver(&member.handle, event) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(failure) => failed.push((member.id, failure)),
            }
        }

        for (id, failure) in failed {
            // A member that left concurrently is simply not counted.
            if self.registry.leave(id) {
                report.dropped = report.dropped.saturating_add(1);
            }
            debug!(subscriber = %id, sequence = event.sequence, %failure, "delivery failed, subscriber dropped");
        }

        report
    }
}

fn deliver(
    handle: &mpsc::Sender<StreamEvent>,
    event: &MutationEvent,
) -> Result<(), DeliveryFailure> {
    handle
        .try_send(StreamEvent::PixelUpdate(*event))
        .map_err(|e| match e {
            TrySendError::Full(_) => DeliveryFailure::Saturated,
            TrySendError::Closed(_) => DeliveryFailure::Closed,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pixelboard_types::{Color, Coord};

    use super::*;

    fn event(sequence: u64) -> MutationEvent {
        MutationEvent::new(Coord { x: 1, y: 1 }, Color::BLACK, sequence)
    }

    fn sequences(sub: &mut crate::registry::Subscriber) -> Vec<u64> {
        let mut out = Vec::new();
        while let Ok(ev) = sub.try_recv() {
            out.push(ev.sequence());
        }
        out
    }

    #[test]
    fn publish_with_no_subscribers_is_fine() {
        let broadcaster = Broadcaster::new(Arc::new(SubscriptionRegistry::new(4)));
        assert_eq!(broadcaster.publish(&event(1)), PublishReport::default());
    }

    #[test]
    fn every_subscriber_sees_events_in_order() {
        let registry = Arc::new(SubscriptionRegistry::new(16));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let mut a = registry.join();
        let mut b = registry.join();

        for seq in 1..=5 {
            let report = broadcaster.publish(&event(seq));
            assert_eq!(report.delivered, 2);
        }

        assert_eq!(sequences(&mut a), vec![1, 2, 3, 4, 5]);
        assert_eq!(sequences(&mut b), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn saturated_subscriber_is_dropped_without_affecting_others() {
        let registry = Arc::new(SubscriptionRegistry::new(2));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let mut slow = registry.join();
        let mut fast = registry.join();

        broadcaster.publish(&event(1));
        assert_eq!(sequences(&mut fast), vec![1]);
        broadcaster.publish(&event(2));
        assert_eq!(sequences(&mut fast), vec![2]);

        // `slow` has two buffered events, the third overflows it.
        let report = broadcaster.publish(&event(3));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 1 });
        assert!(!registry.contains(slow.id()));
        assert!(registry.contains(fast.id()));

        assert_eq!(sequences(&mut fast), vec![3]);
        assert_eq!(sequences(&mut slow), vec![1, 2]);
        assert!(slow.try_recv().is_err());
    }

    #[test]
    fn delivery_classifies_failures() {
        let (tx, rx) = mpsc::channel(1);
        assert_eq!(deliver(&tx, &event(1)), Ok(()));
        assert_eq!(deliver(&tx, &event(2)), Err(DeliveryFailure::Saturated));
        drop(rx);
        assert_eq!(deliver(&tx, &event(3)), Err(DeliveryFailure::Closed));
    }

    #[test]
    fn late_joiner_only_sees_later_events() {
        let registry = Arc::new(SubscriptionRegistry::new(8));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let mut early = registry.join();
        broadcaster.publish(&event(1));
        let mut late = registry.join();
        broadcaster.publish(&event(2));

        assert_eq!(sequences(&mut early), vec![1, 2]);
        assert_eq!(sequences(&mut late), vec![2]);
    }
}
