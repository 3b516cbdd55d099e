// ABOUTME: Notification model and push payload decoding
// ABOUTME: Converts wire records into in-memory notifications with parsed timestamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a notification within a session
///
/// The server sends either a string or a number. Ids are not guaranteed to be
/// unique across reconnects, so they are only used for read/unread toggling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    /// Numeric identifier
    Number(i64),
    /// String identifier
    Text(String),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for NotificationId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// De-duplication key: two notifications with equal title and message are the same entry
pub type DedupKey = (String, String);

/// A notification held in the in-memory feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Session-scoped identifier
    pub id: NotificationId,
    /// Short headline
    pub title: String,
    /// Body text, may contain limited markup
    pub message: String,
    /// Creation time reported by the server
    pub created_at: DateTime<Utc>,
    /// Whether the consumer has not yet read this notification
    pub unread: bool,
    /// Auxiliary string values
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Highlighted "match" category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_match: Option<bool>,
}

impl Notification {
    /// Owned de-duplication key for this notification
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        (self.title.clone(), self.message.clone())
    }

    /// Message with HTML special characters escaped, for HTML render layers
    #[must_use]
    pub fn sanitized_message(&self) -> String {
        html_escape::encode_safe(&self.message).into_owned()
    }

    /// Whether this notification belongs to the highlighted match category
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.has_match.unwrap_or(false)
    }
}

/// A notification record exactly as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNotification {
    /// Session-scoped identifier
    pub id: NotificationId,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// ISO-8601 creation time
    pub created_at: String,
    /// Highlighted "match" category
    #[serde(default)]
    pub has_match: Option<bool>,
    /// Auxiliary string values, may be absent or null
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    /// Server-side read state, ignored on receipt
    #[serde(default)]
    pub unread: Option<bool>,
}

impl WireNotification {
    /// Convert into an in-memory notification
    ///
    /// Every received notification starts unread regardless of what the server sent.
    ///
    /// # Errors
    ///
    /// Returns an error if `createdAt` is not a parseable timestamp
    pub fn into_notification(self) -> AppResult<Notification> {
        let created_at = parse_created_at(&self.created_at)?;
        Ok(Notification {
            id: self.id,
            title: self.title,
            message: self.message,
            created_at,
            unread: true,
            metadata: self.metadata.unwrap_or_default(),
            has_match: self.has_match,
        })
    }
}

/// Payload of a single push event
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationBatch {
    /// Notifications in arrival order
    pub notifications: Vec<WireNotification>,
}

/// ISO-8601 date-times with an explicit offset (`+0000`, `+00:00`, `+05`)
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// ISO-8601 date-times without an offset, read as UTC
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a `createdAt` string into a UTC timestamp
///
/// Accepts RFC 3339 plus the other ISO-8601 forms servers commonly emit: an
/// offset without a colon, a time without seconds, and a bare date (midnight).
/// A missing offset or a trailing `Z` means UTC.
///
/// # Errors
///
/// Returns `InvalidTimestamp` if no form parses
pub fn parse_created_at(value: &str) -> AppResult<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let local = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => rest,
        None => {
            let with_offset = OFFSET_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(trimmed, format).ok());
            if let Some(parsed) = with_offset {
                return Ok(parsed.with_timezone(&Utc));
            }
            trimmed
        }
    };

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(local, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(local, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::invalid_timestamp(value))
}

/// Decode one push event's `data` field into notifications
///
/// The whole event is rejected if any record fails to decode, so a batch is
/// applied all-or-nothing.
///
/// # Errors
///
/// Returns a decode error for malformed JSON, a payload of the wrong shape,
/// or an unparseable timestamp
pub fn decode_batch(data: &str) -> AppResult<Vec<Notification>> {
    let batch: NotificationBatch = serde_json::from_str(data)?;
    batch
        .notifications
        .into_iter()
        .map(WireNotification::into_notification)
        .collect()
}
