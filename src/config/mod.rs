// ABOUTME: Configuration management module for the notification stream
// ABOUTME: Environment-only configuration for the push endpoint and connection behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module
//!
//! All settings come from environment variables:
//!
//! - **Endpoint**: `AKAZA_API_BASE_URL`, `AKAZA_NOTIFICATIONS_PATH`
//! - **Credentials**: `AKAZA_SESSION_COOKIE`
//! - **Connection**: `SSE_CONNECT_TIMEOUT_SECS`, `SSE_RETRY_INITIAL_MS`,
//!   `SSE_RETRY_MAX_MS`, `SSE_EVENT_CHANNEL_SIZE`

/// Push endpoint and connection settings
pub mod stream;

pub use stream::{parse_base_url, StreamConfig, BASE_URL_ENV};
