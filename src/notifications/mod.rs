// ABOUTME: Real-time notification feed: bounded history, push stream, and provider scope
// ABOUTME: Merges server-pushed batches into a de-duplicated list exposed to consumers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bounded, de-duplicated notification history
pub mod history;
/// Scope-bound provider and `use_notifications` accessor
pub mod provider;
/// Push connection plus history merge
pub mod stream;

pub use history::{MergeOutcome, NotificationHistory};
pub use provider::{
    use_notifications, NotificationContext, NotificationProvider, SessionState, StaticSession,
};
pub use stream::{NotificationStream, Snapshot};
