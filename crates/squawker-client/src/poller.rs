use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use squawker_db::Database;
use squawker_db::models::PreferenceRow;
use squawker_types::ChangeEvent;

use crate::notifier::ChangeNotifier;

/// What the poller last saw of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoreSnapshot {
    version: i64,
    squawks: (i64, i64),
    preferences: Vec<PreferenceRow>,
}

impl StoreSnapshot {
    fn read(db: &Database) -> Result<Self> {
        Ok(Self {
            version: db.data_version()?,
            squawks: db.squawk_watermark()?,
            preferences: db.list_preferences()?,
        })
    }

    fn changes_since(&self, previous: &StoreSnapshot) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        if self.squawks != previous.squawks {
            events.push(ChangeEvent::SquawksChanged);
        }
        if self.preferences != previous.preferences {
            events.push(ChangeEvent::FollowingChanged);
        }
        events
    }
}

/// Watches the database file for commits made by other processes: new or
/// removed squawks become [`ChangeEvent::SquawksChanged`], follow
/// preference writes become [`ChangeEvent::FollowingChanged`].
pub struct ChangePoller {
    db: Arc<Database>,
    last: StoreSnapshot,
}

impl ChangePoller {
    /// Records the current state of the store. Every commit made after this
    /// returns is announced once [`ChangePoller::run`] is polling.
    pub async fn start(db: Arc<Database>) -> Result<Self> {
        let reader = db.clone();
        let last = tokio::task::spawn_blocking(move || StoreSnapshot::read(&reader)).await??;
        debug!(version = last.version, "Change poller baseline taken");
        Ok(Self { db, last })
    }

    /// Polls every `interval` until the task is aborted or the notifier
    /// loses its last subscriber.
    pub async fn run(mut self, notifier: ChangeNotifier, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if notifier.subscriber_count() == 0 {
                debug!("No list is listening, stopping change poller");
                return;
            }

            let db = self.db.clone();
            let last_version = self.last.version;
            let polled = tokio::task::spawn_blocking(move || -> Result<Option<StoreSnapshot>> {
                if db.data_version()? == last_version {
                    return Ok(None);
                }
                StoreSnapshot::read(&db).map(Some)
            })
            .await;

            let current = match polled {
                Ok(Ok(Some(snapshot))) => snapshot,
                Ok(Ok(None)) => continue,
                Ok(Err(e)) => {
                    warn!("Change poll failed: {}", e);
                    continue;
                }
                Err(e) => {
                    warn!("Change poll task failed: {}", e);
                    continue;
                }
            };

            for event in current.changes_since(&self.last) {
                debug!(
                    ?event,
                    version = current.version,
                    "Database changed by another process"
                );
                notifier.notify(event);
            }
            self.last = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squawker_types::{KnownAuthor, Squawk};

    fn squawk(message: &str) -> Squawk {
        Squawk {
            author: "TestAccount".into(),
            author_key: "key_test".into(),
            message: message.into(),
            date: 1,
        }
    }

    async fn next_event(sub: &mut crate::notifier::Subscription) -> Option<ChangeEvent> {
        tokio::time::timeout(Duration::from_secs(5), sub.changed())
            .await
            .expect("no change announced")
    }

    #[tokio::test]
    async fn commit_from_another_connection_is_announced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squawker.db");
        let watched = Arc::new(Database::open(&path).unwrap());
        let writer = Database::open(&path).unwrap();

        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        let poller = ChangePoller::start(watched).await.unwrap();
        let task = tokio::spawn(poller.run(notifier.clone(), Duration::from_millis(10)));

        writer.insert_squawk(&squawk("from elsewhere")).unwrap();

        assert_eq!(next_event(&mut sub).await, Some(ChangeEvent::SquawksChanged));
        task.abort();
    }

    #[tokio::test]
    async fn commit_before_polling_starts_is_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squawker.db");
        let watched = Arc::new(Database::open(&path).unwrap());
        let writer = Database::open(&path).unwrap();

        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        let poller = ChangePoller::start(watched).await.unwrap();

        // lands after the baseline but before the first tick
        writer.insert_squawk(&squawk("early")).unwrap();
        let task = tokio::spawn(poller.run(notifier.clone(), Duration::from_millis(10)));

        assert_eq!(next_event(&mut sub).await, Some(ChangeEvent::SquawksChanged));
        task.abort();
    }

    #[tokio::test]
    async fn follow_from_another_connection_is_a_following_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squawker.db");
        let watched = Arc::new(Database::open(&path).unwrap());
        let writer = Database::open(&path).unwrap();

        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        let poller = ChangePoller::start(watched).await.unwrap();
        let task = tokio::spawn(poller.run(notifier.clone(), Duration::from_millis(10)));

        writer.set_preference(KnownAuthor::Cezanne.key(), true).unwrap();

        assert_eq!(next_event(&mut sub).await, Some(ChangeEvent::FollowingChanged));
        assert_eq!(sub.drain(), 0);
        task.abort();
    }

    #[tokio::test]
    async fn stops_when_nobody_listens() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let notifier = ChangeNotifier::new();
        let poller = ChangePoller::start(db).await.unwrap();
        let task = tokio::spawn(poller.run(notifier, Duration::from_millis(5)));

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("poller kept running")
            .unwrap();
    }
}
