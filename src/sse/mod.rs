// ABOUTME: Server-Sent Events client infrastructure for the notification feed
// ABOUTME: Message events, reconnection policy, and the long-lived push connection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Push connection with native reconnection semantics
pub mod event_source;
/// Events delivered to the connection's listener
pub mod message;
/// Reconnection delay policy
pub mod reconnect;

pub use event_source::{EventSource, EventSourceOptions, ReadyState};
pub use message::MessageEvent;
pub use reconnect::ReconnectPolicy;
