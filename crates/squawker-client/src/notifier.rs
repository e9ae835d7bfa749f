use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

use squawker_types::events::ChangeEvent;

const DEFAULT_CAPACITY: usize = 64;

/// Fans change signals out to every subscribed list.
#[derive(Clone)]
pub struct ChangeNotifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    /// Broadcast channel for change events; every subscription sees every event
    broadcast_tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(NotifierInner { broadcast_tx }),
        }
    }

    /// Register for change events. Dropping the returned subscription
    /// unregisters it.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.inner.broadcast_tx.subscribe(),
        }
    }

    /// Signal every current subscriber. A notification with nobody
    /// listening is dropped.
    pub fn notify(&self, event: ChangeEvent) {
        if self.inner.broadcast_tx.send(event).is_err() {
            debug!(?event, "Change notification with no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcast_tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Waits for the next change. Returns `None` once every notifier handle
    /// is gone.
    ///
    /// A subscriber that fell behind has lost events but not information:
    /// it still only needs to re-read, so lag is reported as a change.
    pub async fn changed(&mut self) -> Option<ChangeEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Subscription lagged, treating as change");
                Some(ChangeEvent::SquawksChanged)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Discards already-queued events and returns how many there were.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.rx.try_recv() {
                Ok(_) => drained += 1,
                Err(TryRecvError::Lagged(skipped)) => drained += skipped as usize,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return drained,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let notifier = ChangeNotifier::new();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.notify(ChangeEvent::SquawksChanged);
        notifier.notify(ChangeEvent::FollowingChanged);

        assert_eq!(a.changed().await, Some(ChangeEvent::SquawksChanged));
        assert_eq!(a.changed().await, Some(ChangeEvent::FollowingChanged));
        assert_eq!(b.changed().await, Some(ChangeEvent::SquawksChanged));
        assert_eq!(b.drain(), 1);
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 1);

        drop(sub);
        assert_eq!(notifier.subscriber_count(), 0);

        // no receivers left; must not panic
        notifier.notify(ChangeEvent::SquawksChanged);
    }

    #[tokio::test]
    async fn lag_is_reported_as_a_change() {
        let notifier = ChangeNotifier::with_capacity(2);
        let mut sub = notifier.subscribe();
        for _ in 0..5 {
            notifier.notify(ChangeEvent::FollowingChanged);
        }

        assert_eq!(sub.changed().await, Some(ChangeEvent::SquawksChanged));
        assert_eq!(sub.drain(), 2);
    }

    #[tokio::test]
    async fn closed_notifier_ends_subscription() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        drop(notifier);
        assert_eq!(sub.changed().await, None);
    }
}
