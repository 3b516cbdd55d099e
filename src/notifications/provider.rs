// ABOUTME: Scope-bound notification provider and its accessor
// ABOUTME: Owns the stream for an authenticated session and fails fast when used out of scope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Notification Provider
//!
//! The provider owns at most one [`NotificationStream`] and makes it reachable
//! from any code running inside [`NotificationProvider::scope`] through
//! [`use_notifications`]. Reaching for the feed outside a scope is a wiring bug
//! and returns `ErrorCode::ProviderMissing` instead of an empty feed.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use super::stream::{NotificationStream, Snapshot};
use crate::config::StreamConfig;
use crate::errors::{AppError, AppResult};

/// Authentication context consulted before opening a stream
pub trait SessionState {
    /// Whether a user session is active
    fn is_authenticated(&self) -> bool;
}

/// Session whose state is known up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSession(pub bool);

impl SessionState for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// What consumers see of the provider: the feed, the connection, and a clear operation
#[derive(Clone)]
pub struct NotificationContext {
    stream: Option<Arc<NotificationStream>>,
}

impl NotificationContext {
    /// Current feed, oldest first; empty when no stream is open
    #[must_use]
    pub fn messages(&self) -> Snapshot {
        self.stream
            .as_ref()
            .map_or_else(|| Arc::from(Vec::new()), |stream| stream.messages())
    }

    /// The open stream, if the session was authenticated
    #[must_use]
    pub const fn client(&self) -> Option<&Arc<NotificationStream>> {
        self.stream.as_ref()
    }

    /// Empty the local feed
    pub fn clear_messages(&self) {
        if let Some(stream) = &self.stream {
            stream.clear_messages();
        }
    }

    /// Number of unread notifications, for badges
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.stream
            .as_ref()
            .map_or(0, |stream| stream.unread_count())
    }
}

tokio::task_local! {
    static CURRENT: NotificationContext;
}

/// Owner of the notification stream for one session
///
/// Dropping the provider (or calling [`NotificationProvider::shutdown`])
/// tears the stream down even if contexts are still held elsewhere.
pub struct NotificationProvider {
    context: NotificationContext,
}

impl NotificationProvider {
    /// Build a provider, opening the stream only for authenticated sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be opened from `config`
    pub fn new(config: &StreamConfig, session: &dyn SessionState) -> AppResult<Self> {
        if !session.is_authenticated() {
            debug!("No active session, notification stream not opened");
            return Ok(Self::detached());
        }

        let stream = NotificationStream::from_config(config)?;
        info!(url = %stream.url(), "Notification provider started");
        Ok(Self::with_stream(stream))
    }

    /// Provider around an already opened stream
    #[must_use]
    pub fn with_stream(stream: NotificationStream) -> Self {
        Self {
            context: NotificationContext {
                stream: Some(Arc::new(stream)),
            },
        }
    }

    /// Provider without a stream (anonymous session)
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            context: NotificationContext { stream: None },
        }
    }

    /// Context handed to consumers
    #[must_use]
    pub fn context(&self) -> NotificationContext {
        self.context.clone()
    }

    /// Run `future` with this provider's context installed
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT.scope(self.context(), future).await
    }

    /// Run `f` synchronously with this provider's context installed
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self.context(), f)
    }

    /// Tear down the stream; idempotent
    pub fn shutdown(&self) {
        if let Some(stream) = &self.context.stream {
            stream.close();
        }
    }
}

impl Drop for NotificationProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Access the notification context of the enclosing provider scope
///
/// # Errors
///
/// Returns `ErrorCode::ProviderMissing` when called outside of
/// [`NotificationProvider::scope`] or [`NotificationProvider::sync_scope`]
pub fn use_notifications() -> AppResult<NotificationContext> {
    CURRENT
        .try_with(NotificationContext::clone)
        .map_err(|_| AppError::provider_missing("use_notifications"))
}
