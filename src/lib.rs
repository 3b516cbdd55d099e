// ABOUTME: Main library entry point for the Akaza real-time notification stream
// ABOUTME: Server-push client that merges notification batches into a bounded, de-duplicated feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Akaza Notifications
//!
//! Client side of the Akaza real-time notification feed. A push connection
//! (Server-Sent Events) delivers batches of notifications for employers and job
//! hunters; this crate merges them into one feed that consumers render as a
//! list or a badge count.
//!
//! ## Features
//!
//! - **Native push semantics**: reconnects with `Last-Event-ID` and honors the
//!   server's `retry:` hint
//! - **Bounded feed**: at most 50 notifications, oldest evicted first
//! - **De-duplication**: one entry per `(title, message)` pair, first arrival wins
//! - **Resilient decoding**: a malformed event is logged and dropped
//! - **Scoped access**: the feed is reachable only inside a provider scope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use akaza_notifications::config::StreamConfig;
//! use akaza_notifications::errors::AppResult;
//! use akaza_notifications::notifications::{use_notifications, NotificationProvider, StaticSession};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = StreamConfig::from_env()?;
//!     let provider = NotificationProvider::new(&config, &StaticSession(true))?;
//!
//!     provider
//!         .scope(async {
//!             let feed = use_notifications()?;
//!             println!("{} unread", feed.unread_count());
//!             AppResult::Ok(())
//!         })
//!         .await
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Notification data models
pub mod models;

/// Notification history, stream, and provider
pub mod notifications;

/// Server-Sent Events client infrastructure
pub mod sse;
