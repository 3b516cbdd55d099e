// ABOUTME: Long-lived server-push connection with native EventSource semantics
// ABOUTME: Decodes the body with eventsource-stream, hands events to one listener, reconnects on drops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Push Connection
//!
//! [`EventSource`] owns one HTTP event stream. It behaves like the browser
//! primitive of the same name:
//!
//! - the request is sent immediately on construction
//! - a dropped connection or an ended body is retried after the reconnection
//!   delay, sending `Last-Event-ID` so the server can resume
//! - a response that is not `200 text/event-stream` fails the connection for
//!   good
//! - `close()` is terminal and idempotent
//!
//! Transport failures are logged here and never surfaced to the consumer.

use std::pin::pin;
use std::sync::{Arc, Mutex, PoisonError};

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};
use url::Url;

use super::message::MessageEvent;
use super::reconnect::ReconnectPolicy;
use crate::constants::network_config::SSE_EVENT_CHANNEL_SIZE;
use crate::constants::wire::{EVENT_STREAM_CONTENT_TYPE, LAST_EVENT_ID_HEADER};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Connection state, mirroring `EventSource.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Request in flight or waiting to reconnect
    Connecting,
    /// Receiving events
    Open,
    /// Terminal: closed by the owner or failed permanently
    Closed,
}

/// Options for a push connection
#[derive(Debug, Clone)]
pub struct EventSourceOptions {
    /// Reconnection delay policy
    pub reconnect: ReconnectPolicy,
    /// Capacity of the channel between the connection task and its listener
    pub channel_size: usize,
}

impl Default for EventSourceOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            channel_size: SSE_EVENT_CHANNEL_SIZE,
        }
    }
}

/// Handle to a running push connection
///
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct EventSource {
    url: Url,
    state: Arc<watch::Sender<ReadyState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventSource {
    /// Open a push connection to `url`
    ///
    /// Returns the handle and the receiving end of the event channel. Only one
    /// consumer can read events.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside of a tokio runtime
    pub fn connect(
        client: Client,
        url: Url,
        options: EventSourceOptions,
    ) -> AppResult<(Self, mpsc::Receiver<MessageEvent>)> {
        let runtime = Handle::try_current().map_err(|e| {
            AppError::internal("EventSource must be opened inside a tokio runtime").with_source(e)
        })?;

        let (events_tx, events_rx) = mpsc::channel(options.channel_size.max(1));
        let (state_tx, _) = watch::channel(ReadyState::Connecting);
        let state = Arc::new(state_tx);

        let connection = Connection {
            client,
            url: url.clone(),
            reconnect: options.reconnect,
            state: Arc::clone(&state),
            events: events_tx,
        };

        info!(url = %url, "Opening push connection");
        let task = runtime.spawn(connection.run());

        Ok((
            Self {
                url,
                state,
                task: Mutex::new(Some(task)),
            },
            events_rx,
        ))
    }

    /// Endpoint this connection targets
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Current connection state
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        *self.state.borrow()
    }

    /// Watch connection state changes
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ReadyState> {
        self.state.subscribe()
    }

    /// Close the connection
    ///
    /// Safe to call any number of times; only the first call has an effect.
    pub fn close(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            self.state.send_replace(ReadyState::Closed);
            task.abort();
            info!(url = %self.url, "Push connection closed");
        }
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// State owned by the background connection task
struct Connection {
    client: Client,
    url: Url,
    reconnect: ReconnectPolicy,
    state: Arc<watch::Sender<ReadyState>>,
    events: mpsc::Sender<MessageEvent>,
}

impl Connection {
    async fn run(self) {
        let mut last_event_id = String::new();
        let mut retry_ms = self.reconnect.initial_delay_ms;
        let mut failures: u32 = 0;

        loop {
            if !self.transition(ReadyState::Connecting) {
                return;
            }

            let opened = self.open(&last_event_id).await;
            let attempt = match opened {
                Ok(response) => {
                    if !self.transition(ReadyState::Open) {
                        return;
                    }
                    failures = 0;
                    info!(url = %self.url, "Push connection open");
                    self.pump(response, &mut last_event_id, &mut retry_ms).await;
                    0
                }
                Err(err) if err.code == ErrorCode::TransportRejected => {
                    error!(url = %self.url, error = %err, "Push endpoint rejected the connection, not reconnecting");
                    self.transition(ReadyState::Closed);
                    return;
                }
                Err(err) => {
                    warn!(url = %self.url, error = %err, failures, "Push connection attempt failed");
                    let attempt = failures;
                    failures = failures.saturating_add(1);
                    attempt
                }
            };

            if !self.transition(ReadyState::Connecting) {
                return;
            }
            let delay = self.reconnect.delay_for_attempt(retry_ms, attempt);
            debug!(
                url = %self.url,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting push connection"
            );
            time::sleep(delay).await;
        }
    }

    /// Move to `next` unless the owner already closed the connection
    fn transition(&self, next: ReadyState) -> bool {
        let mut accepted = false;
        self.state.send_if_modified(|current| {
            if *current == ReadyState::Closed {
                return false;
            }
            accepted = true;
            let changed = *current != next;
            *current = next;
            changed
        });
        accepted
    }

    async fn open(&self, last_event_id: &str) -> AppResult<Response> {
        let mut request = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-cache");
        if !last_event_id.is_empty() {
            request = request.header(LAST_EVENT_ID_HEADER, last_event_id);
        }

        let response = request.send().await.map_err(|e| {
            AppError::transport(format!("Failed to reach push endpoint: {e}")).with_source(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::transport_rejected(format!(
                "Push endpoint answered {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !is_event_stream(content_type) {
            return Err(AppError::transport_rejected(format!(
                "Push endpoint answered with content type '{content_type}'"
            )));
        }

        Ok(response)
    }

    /// Forward decoded events until the body ends or fails
    ///
    /// A `retry:` field is applied when the frame carrying it is dispatched.
    async fn pump(&self, response: Response, last_event_id: &mut String, retry_ms: &mut u64) {
        let mut frames = pin!(response.bytes_stream().eventsource());

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(event) => {
                    if let Some(retry) = event.retry {
                        let millis = u64::try_from(retry.as_millis()).unwrap_or(u64::MAX);
                        debug!(retry_ms = millis, "Server updated reconnection delay");
                        *retry_ms = millis;
                    }
                    let message = MessageEvent::resumed(event, last_event_id);
                    last_event_id.clone_from(&message.last_event_id);
                    if self.events.send(message).await.is_err() {
                        debug!(url = %self.url, "No listener attached, event discarded");
                    }
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "Push connection dropped");
                    return;
                }
            }
        }

        info!(url = %self.url, "Push stream ended by server");
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM_CONTENT_TYPE))
}
