// ABOUTME: Reconnection delay policy for the push connection
// ABOUTME: Capped exponential backoff on top of the server-provided retry hint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use rand::Rng;

use crate::constants::network_config::{SSE_DEFAULT_RETRY_MS, SSE_MAX_RETRY_MS};

/// Reconnection policy for the push connection
///
/// The base delay is whatever the server last announced with `retry:` (or the
/// default). Consecutive failed attempts double it up to `max_delay_ms`. The
/// cap only limits the growth: a server hint above it is still honored.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay used until the server sends a `retry:` field (milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay cap for exponential backoff (milliseconds)
    pub max_delay_ms: u64,
    /// Add up to 99ms of jitter to each delay
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: SSE_DEFAULT_RETRY_MS,
            max_delay_ms: SSE_MAX_RETRY_MS,
            jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// Calculate the delay before reconnect attempt `attempt` (0-based)
    ///
    /// `delay = max(base_ms, min(base_ms * 2^attempt, max_ms)) + jitter(0..100ms)`
    #[must_use]
    pub fn delay_for_attempt(&self, base_ms: u64, attempt: u32) -> Duration {
        let factor = 1_u64 << attempt.min(16);
        let grown = base_ms.saturating_mul(factor).min(self.max_delay_ms);
        let delay = grown.max(base_ms);
        let jitter = if self.jitter {
            rand::thread_rng().gen_range(0..100)
        } else {
            0
        };
        Duration::from_millis(delay.saturating_add(jitter))
    }
}
