// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Notification buffer limits, wire paths, and SSE reconnection defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single flat list.

/// In-memory notification history limits
pub mod history {
    /// Maximum number of notifications retained in memory
    pub const MAX_NOTIFICATIONS: usize = 50;
}

/// Push endpoint wire constants
pub mod wire {
    /// Path suffix appended to the API base URL to reach the push endpoint
    pub const NOTIFICATIONS_STREAM_PATH: &str = "/notifications/stream";
    /// Content type an event stream response must declare
    pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
    /// Default SSE event type dispatched to `message` listeners
    pub const DEFAULT_EVENT_TYPE: &str = "message";
    /// Request header carrying the last seen event id on reconnect
    pub const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";
}

/// SSE connection defaults
pub mod network_config {
    /// Reconnection delay used until the server sends a `retry:` field
    pub const SSE_DEFAULT_RETRY_MS: u64 = 3000;
    /// Upper bound on the reconnection delay after repeated failures
    pub const SSE_MAX_RETRY_MS: u64 = 30_000;
    /// Connect timeout for the push request
    pub const SSE_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Capacity of the channel between the connection task and its listener
    pub const SSE_EVENT_CHANNEL_SIZE: usize = 64;
}

/// Service identifiers used in structured logs
pub mod service_names {
    /// Notification stream library and CLI
    pub const AKAZA_NOTIFY: &str = "akaza-notify";
}

pub use history::MAX_NOTIFICATIONS;
