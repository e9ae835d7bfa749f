use std::fmt::Display;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use squawker_types::contract::ORDER_BY_DATE_DESC;
use squawker_types::{KnownAuthor, RowViewModel};

use crate::error::Result;
use crate::notifier::{ChangeNotifier, Subscription};
use crate::source::{PreferenceStore, SquawkCursor, SquawkSource, load_follow_preferences};
use crate::time_format::{Clock, RelativeTimeFormatter, SystemClock};
use crate::view::SquawkView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Owns the displayed squawk list and rebuilds it from the store on demand.
pub struct MessageListController<V, Tz: TimeZone = Local> {
    source: Arc<dyn SquawkSource>,
    preferences: Arc<dyn PreferenceStore>,
    view: V,
    clock: Arc<dyn Clock>,
    formatter: RelativeTimeFormatter<Tz>,
    cursor: Option<SquawkCursor>,
    rows: Vec<RowViewModel>,
    state: RefreshState,
    refreshes: u64,
}

impl<V: SquawkView> MessageListController<V, Local> {
    pub fn new(
        source: Arc<dyn SquawkSource>,
        preferences: Arc<dyn PreferenceStore>,
        view: V,
    ) -> Self {
        Self {
            source,
            preferences,
            view,
            clock: Arc::new(SystemClock),
            formatter: RelativeTimeFormatter::local(),
            cursor: None,
            rows: Vec::new(),
            state: RefreshState::Idle,
            refreshes: 0,
        }
    }
}

impl<V, Tz> MessageListController<V, Tz>
where
    V: SquawkView,
    Tz: TimeZone + Send + 'static,
    Tz::Offset: Display,
{
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Swaps the zone used for calendar-date labels.
    pub fn with_formatter<Tz2>(
        self,
        formatter: RelativeTimeFormatter<Tz2>,
    ) -> MessageListController<V, Tz2>
    where
        Tz2: TimeZone,
    {
        MessageListController {
            source: self.source,
            preferences: self.preferences,
            view: self.view,
            clock: self.clock,
            formatter,
            cursor: self.cursor,
            rows: self.rows,
            state: self.state,
            refreshes: self.refreshes,
        }
    }

    pub fn rows(&self) -> &[RowViewModel] {
        &self.rows
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Completed refreshes since construction.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    pub fn has_open_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Re-reads follow preferences, re-queries the store and publishes the
    /// new list. Returns the number of rows shown.
    ///
    /// Never fails: an unavailable or failing store shows an empty list.
    pub async fn refresh(&mut self) -> usize {
        self.state = RefreshState::Refreshing;

        // One sample per refresh so every row is aged against the same instant
        let now = self.clock.now_millis();

        // Release before re-querying: at most one cursor is ever open
        if let Some(previous) = self.cursor.take() {
            previous.close();
        }

        let source = Arc::clone(&self.source);
        let preferences = Arc::clone(&self.preferences);
        let queried = tokio::task::spawn_blocking(move || {
            let selection = load_follow_preferences(preferences.as_ref()).selection();
            debug!("Selection is {}", selection);
            source.query(&selection, ORDER_BY_DATE_DESC)
        })
        .await;

        self.cursor = match queried {
            Ok(Ok(Some(cursor))) => Some(cursor),
            Ok(Ok(None)) => {
                debug!("No data source yet, showing an empty list");
                None
            }
            Ok(Err(e)) => {
                warn!("Squawk query failed, showing an empty list: {:#}", e);
                None
            }
            Err(e) => {
                error!("Squawk query task failed: {}", e);
                None
            }
        };

        self.rows = self.map_rows(now);
        self.state = RefreshState::Idle;
        self.refreshes += 1;
        self.view.show(&self.rows);

        self.rows.len()
    }

    fn map_rows(&self, now: i64) -> Vec<RowViewModel> {
        let Some(cursor) = &self.cursor else {
            return Vec::new();
        };

        cursor
            .iter()
            .map(|squawk| RowViewModel {
                author: squawk.author.clone(),
                message: squawk.message.clone(),
                date_label: self.formatter.format(squawk.date_millis(), now),
                avatar: KnownAuthor::avatar_for_key(&squawk.author_key).to_string(),
            })
            .collect()
    }

    /// Subscribes to `notifier`, then moves the controller onto its own task:
    /// an initial load followed by one refresh per change notification.
    ///
    /// Notifications that arrive while a refresh is running are folded into
    /// a single follow-up refresh.
    pub fn attach(self, notifier: &ChangeNotifier) -> ControllerHandle<V, Tz> {
        let subscription = notifier.subscribe();
        let refresh_requested = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(self.run(subscription, refresh_requested.clone(), shutdown_rx));

        ControllerHandle {
            refresh_requested,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut subscription: Subscription,
        refresh_requested: Arc<Notify>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Self {
        let rows = self.refresh().await;
        info!("Squawk list attached ({} rows)", rows);

        loop {
            tokio::select! {
                biased;

                // Fires on detach() and when the handle is dropped
                _ = &mut shutdown => break,

                event = subscription.changed() => match event {
                    Some(event) => {
                        let coalesced = subscription.drain();
                        debug!(?event, coalesced, "Change notification");
                    }
                    None => {
                        debug!("Change notifier closed");
                        break;
                    }
                },

                _ = refresh_requested.notified() => {
                    debug!("Refresh requested");
                }
            }

            self.refresh().await;
        }

        drop(subscription);
        info!("Squawk list detached after {} refreshes", self.refreshes);
        self
    }
}

/// Handle to an attached [`MessageListController`]. Dropping it detaches
/// the controller as well.
pub struct ControllerHandle<V, Tz: TimeZone = Local> {
    refresh_requested: Arc<Notify>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<MessageListController<V, Tz>>,
}

impl<V, Tz> ControllerHandle<V, Tz>
where
    V: SquawkView,
    Tz: TimeZone + Send + 'static,
{
    /// Asks for a refresh without a store change. Repeated requests made
    /// before the controller gets to them count once.
    pub fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }

    /// Unsubscribes from change notifications and waits for the controller
    /// to stop. An in-flight refresh is allowed to finish; none starts after
    /// this returns.
    pub async fn detach(self) -> Result<MessageListController<V, Tz>> {
        let _ = self.shutdown.send(());
        Ok(self.task.await?)
    }
}
