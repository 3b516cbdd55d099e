// ABOUTME: Shared test utilities for the notification stream integration tests
// ABOUTME: Local push endpoint, notification builders, and bounded wait helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `akaza_notifications`
//!
//! [`PushServer`] serves the push endpoint on an ephemeral port. Every
//! connection the client opens is handed to the test as a [`PushConnection`]
//! whose frames the test writes by hand; dropping it ends the response body.

use std::collections::HashMap;
use std::convert::Infallible;
use std::env;
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Level;
use url::Url;

use akaza_notifications::constants::wire::NOTIFICATIONS_STREAM_PATH;
use akaza_notifications::models::{Notification, NotificationId};
use akaza_notifications::notifications::{NotificationStream, Snapshot};
use akaza_notifications::sse::{EventSourceOptions, ReadyState, ReconnectPolicy};

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One client connection accepted by [`PushServer`]
pub struct PushConnection {
    /// `Last-Event-ID` header sent by the client, if any
    pub last_event_id: Option<String>,
    /// `Cookie` header sent by the client, if any
    pub cookie: Option<String>,
    frames: mpsc::Sender<Result<String, Infallible>>,
}

impl PushConnection {
    /// Write raw bytes into the response body
    pub async fn send_raw(&self, frame: impl Into<String>) {
        self.frames.send(Ok(frame.into())).await.unwrap();
    }

    /// Write raw bytes if the client is still reading, reporting whether it was
    pub async fn offer(&self, frame: impl Into<String>) -> bool {
        self.frames.send(Ok(frame.into())).await.is_ok()
    }

    /// Write one batch as a default `message` event
    pub async fn send_batch(&self, id: Option<&str>, items: &[(i64, &str, &str)]) {
        self.send_raw(batch_frame(id, items)).await;
    }
}

struct ServerState {
    status: StatusCode,
    content_type: &'static str,
    connections: mpsc::UnboundedSender<PushConnection>,
}

/// Push endpoint on `127.0.0.1` with an ephemeral port
pub struct PushServer {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<PushConnection>,
    handle: JoinHandle<()>,
}

impl PushServer {
    /// Well-behaved endpoint: `200 OK` with `text/event-stream`
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, "text/event-stream").await
    }

    /// Endpoint answering with the given status and content type
    pub async fn start_with(status: StatusCode, content_type: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(ServerState {
            status,
            content_type,
            connections: tx,
        });

        let app = Router::new()
            .route(NOTIFICATIONS_STREAM_PATH, get(stream_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            connections: rx,
            handle,
        }
    }

    /// Base URL a `StreamConfig` should point at
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Full push endpoint URL
    pub fn endpoint(&self) -> Url {
        Url::parse(&format!("http://{}{NOTIFICATIONS_STREAM_PATH}", self.addr)).unwrap()
    }

    /// Wait for the client's next connection
    pub async fn next_connection(&mut self) -> PushConnection {
        timeout(WAIT, self.connections.recv())
            .await
            .expect("client did not connect in time")
            .expect("push server stopped")
    }

    /// Whether the client connects again within `window`
    pub async fn reconnects_within(&mut self, window: Duration) -> bool {
        matches!(timeout(window, self.connections.recv()).await, Ok(Some(_)))
    }
}

impl Drop for PushServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header_text(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn stream_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let (frames, rx) = mpsc::channel(16);
    let _ = state.connections.send(PushConnection {
        last_event_id: header_text(&headers, "last-event-id"),
        cookie: header_text(&headers, header::COOKIE),
        frames,
    });

    (
        state.status,
        [
            (header::CONTENT_TYPE, state.content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

/// Connection options with short, deterministic reconnection delays
pub fn fast_options() -> EventSourceOptions {
    EventSourceOptions {
        reconnect: ReconnectPolicy {
            initial_delay_ms: 20,
            max_delay_ms: 200,
            jitter: false,
        },
        channel_size: 16,
    }
}

/// Open a stream against `server` with [`fast_options`]
pub fn connect(server: &PushServer) -> NotificationStream {
    NotificationStream::connect(Client::new(), server.endpoint(), fast_options()).unwrap()
}

/// One SSE frame carrying a notification batch
pub fn batch_frame(id: Option<&str>, items: &[(i64, &str, &str)]) -> String {
    let notifications: Vec<_> = items
        .iter()
        .map(|(id, title, message)| {
            json!({
                "id": id,
                "title": title,
                "message": message,
                "createdAt": "2024-05-01T09:30:00Z",
                "unread": false,
            })
        })
        .collect();
    let data = json!({ "notifications": notifications });

    id.map_or_else(
        || format!("data: {data}\n\n"),
        |id| format!("id: {id}\ndata: {data}\n\n"),
    )
}

/// In-memory notification for history tests
pub fn notification(id: i64, title: &str, message: &str) -> Notification {
    Notification {
        id: NotificationId::Number(id),
        title: title.to_owned(),
        message: message.to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        unread: true,
        metadata: HashMap::new(),
        has_match: None,
    }
}

/// Titles of a snapshot, in order
pub fn titles(snapshot: &Snapshot) -> Vec<String> {
    snapshot.iter().map(|n| n.title.clone()).collect()
}

/// Wait until the feed satisfies `predicate`, returning that snapshot
pub async fn wait_for_feed(
    stream: &NotificationStream,
    predicate: impl FnMut(&Snapshot) -> bool,
) -> Snapshot {
    let mut updates = stream.subscribe();
    let snapshot = timeout(WAIT, updates.wait_for(predicate))
        .await
        .expect("feed did not reach the expected state in time")
        .expect("feed publisher dropped");
    Arc::clone(&*snapshot)
}

/// Wait until the connection reaches `state`
pub async fn wait_for_state(stream: &NotificationStream, state: ReadyState) {
    let mut updates = stream.watch_state();
    timeout(WAIT, updates.wait_for(|current| *current == state))
        .await
        .expect("connection did not reach the expected state in time")
        .expect("state publisher dropped");
}
