// ABOUTME: Unified error type and error codes for the notification pipeline
// ABOUTME: Distinguishes transport, decode, misuse, and configuration failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. The error
//! code tells callers which class of failure happened:
//!
//! - transport errors are logged by the connection task and never surfaced
//! - decode errors are per-event and dropped by the listener
//! - misuse errors indicate a wiring bug and should fail loudly

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the notification pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Transport (1000-1999)
    #[serde(rename = "TRANSPORT_ERROR")]
    TransportError = 1000,
    #[serde(rename = "TRANSPORT_REJECTED")]
    TransportRejected = 1001,

    // Decoding (2000-2999)
    #[serde(rename = "DECODE_ERROR")]
    DecodeError = 2000,
    #[serde(rename = "INVALID_TIMESTAMP")]
    InvalidTimestamp = 2001,

    // Misuse (3000-3999)
    #[serde(rename = "PROVIDER_MISSING")]
    ProviderMissing = 3000,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get a developer-facing description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::TransportError => "The push connection failed",
            Self::TransportRejected => "The push endpoint rejected the connection",
            Self::DecodeError => "A push event payload could not be decoded",
            Self::InvalidTimestamp => "A notification timestamp is not valid RFC 3339",
            Self::ProviderMissing => {
                "Notifications were accessed outside of a notification provider scope"
            }
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
        }
    }
}

/// Unified error type for the notification pipeline
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Transport-level failure (connection drop, read error)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, message)
    }

    /// The endpoint answered with something that is not an event stream
    pub fn transport_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportRejected, message)
    }

    /// Malformed event payload
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeError, message)
    }

    /// Notification timestamp failed to parse
    pub fn invalid_timestamp(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTimestamp,
            format!("createdAt '{value}' is not a valid timestamp"),
        )
    }

    /// Accessor used outside of its owning provider scope
    pub fn provider_missing(accessor: &str) -> Self {
        Self::new(
            ErrorCode::ProviderMissing,
            format!("{accessor} must be used within a NotificationProvider scope"),
        )
    }

    /// Required configuration value is absent
    pub fn config_missing(key: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("{key} environment variable is required"),
        )
    }

    /// Configuration value present but unusable
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::decode(format!("Invalid notification payload: {error}")).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
