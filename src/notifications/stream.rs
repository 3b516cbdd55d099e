// ABOUTME: Real-time notification stream combining the push connection and history merge
// ABOUTME: Decodes batches, merges them, and publishes immutable snapshots to consumers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// NOTE: All `.clone()` calls in this file are Safe - they are necessary for:
// - Arc clone for sharing the feed with the listener task
// - Url ownership for the listener's log fields

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::history::{MergeOutcome, NotificationHistory};
use crate::config::StreamConfig;
use crate::errors::AppResult;
use crate::models::{decode_batch, Notification, NotificationId};
use crate::sse::{EventSource, EventSourceOptions, MessageEvent, ReadyState};

/// Immutable view of the feed, oldest first
pub type Snapshot = Arc<[Notification]>;

/// History plus the channel its snapshots are published on
///
/// Every mutation happens under the lock and publishes a fresh snapshot before
/// the lock is released, so consumers never see a partially merged list.
struct Feed {
    history: Mutex<NotificationHistory>,
    snapshots: watch::Sender<Snapshot>,
}

impl Feed {
    fn new() -> Self {
        let history = NotificationHistory::new();
        let (snapshots, _) = watch::channel(history.snapshot());
        Self {
            history: Mutex::new(history),
            snapshots,
        }
    }

    fn update<R>(&self, apply: impl FnOnce(&mut NotificationHistory) -> R) -> R {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let result = apply(&mut history);
        self.snapshots.send_replace(history.snapshot());
        result
    }
}

/// Notification feed backed by one push connection
///
/// Construction opens the connection immediately. Each well-formed batch is
/// merged into a bounded, de-duplicated history; malformed events are logged
/// and dropped. Dropping the stream tears it down.
pub struct NotificationStream {
    source: EventSource,
    feed: Arc<Feed>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationStream {
    /// Open a notification stream on `url`
    ///
    /// # Errors
    ///
    /// Returns an error when called outside of a tokio runtime
    pub fn connect(client: Client, url: Url, options: EventSourceOptions) -> AppResult<Self> {
        let (source, events) = EventSource::connect(client, url, options)?;
        let feed = Arc::new(Feed::new());
        let listener = tokio::spawn(listen(events, Arc::clone(&feed), source.url().clone()));

        Ok(Self {
            source,
            feed,
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Open a notification stream using environment-derived configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL or HTTP client cannot be built, or
    /// when called outside of a tokio runtime
    pub fn from_config(config: &StreamConfig) -> AppResult<Self> {
        let client = config.build_http_client()?;
        let url = config.endpoint_url()?;
        Self::connect(client, url, config.event_source_options())
    }

    /// Current feed, oldest first
    #[must_use]
    pub fn messages(&self) -> Snapshot {
        Arc::clone(&*self.feed.snapshots.borrow())
    }

    /// Receive every new snapshot as it is published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.feed.snapshots.subscribe()
    }

    /// Empty the local feed without touching the connection
    pub fn clear_messages(&self) {
        self.feed.update(NotificationHistory::clear);
        debug!(url = %self.source.url(), "Notification feed cleared");
    }

    /// Mark notifications with `id` as read
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        self.feed.update(|history| history.mark_read(id))
    }

    /// Mark the whole feed as read, returning how many entries changed
    pub fn mark_all_read(&self) -> usize {
        self.feed.update(NotificationHistory::mark_all_read)
    }

    /// Number of unread notifications in the current feed
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.messages().iter().filter(|n| n.unread).count()
    }

    /// State of the underlying connection
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.source.ready_state()
    }

    /// Watch state changes of the underlying connection
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ReadyState> {
        self.source.watch_state()
    }

    /// Endpoint this stream is connected to
    #[must_use]
    pub const fn url(&self) -> &Url {
        self.source.url()
    }

    /// Tear the stream down: detach the listener, then close the connection
    ///
    /// Only the first call has an effect.
    pub fn close(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(listener) = listener else {
            return;
        };
        listener.abort();
        self.source.close();
        info!(url = %self.source.url(), "Notification stream torn down");
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        self.close();
    }
}

async fn listen(mut events: mpsc::Receiver<MessageEvent>, feed: Arc<Feed>, url: Url) {
    while let Some(event) = events.recv().await {
        if !event.is_message() {
            debug!(url = %url, event_type = %event.event_type, "Ignoring non-message push event");
            continue;
        }

        match decode_batch(&event.data) {
            Ok(batch) => {
                let received = batch.len();
                let MergeOutcome {
                    added,
                    duplicates,
                    evicted,
                } = feed.update(|history| history.merge_batch(batch));
                debug!(
                    url = %url,
                    received,
                    added,
                    duplicates,
                    evicted,
                    "Merged notification batch"
                );
            }
            Err(e) => {
                warn!(
                    url = %url,
                    error = %e,
                    last_event_id = %event.last_event_id,
                    "Dropping malformed notification event"
                );
            }
        }
    }
    debug!(url = %url, "Notification listener finished");
}
