// ABOUTME: Push endpoint and connection configuration for the notification stream
// ABOUTME: Loads base URL, session cookie, timeouts, and reconnection settings from environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use url::Url;

use crate::constants::network_config::{
    SSE_CONNECT_TIMEOUT_SECS, SSE_DEFAULT_RETRY_MS, SSE_EVENT_CHANNEL_SIZE, SSE_MAX_RETRY_MS,
};
use crate::constants::wire::NOTIFICATIONS_STREAM_PATH;
use crate::errors::{AppError, AppResult};
use crate::sse::{EventSourceOptions, ReconnectPolicy};

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "AKAZA_API_BASE_URL";

/// Notification stream configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Absolute API base URL (`http` or `https`)
    pub base_url: Url,
    /// Path appended to the base URL to reach the push endpoint
    pub notifications_path: String,
    /// `Cookie` header value sent with the push request
    pub session_cookie: Option<String>,
    /// Connect timeout for the push request in seconds
    pub connect_timeout_secs: u64,
    /// Reconnection delay until the server sends `retry:` (milliseconds)
    pub retry_initial_ms: u64,
    /// Maximum reconnection delay (milliseconds)
    pub retry_max_ms: u64,
    /// Capacity of the event channel between connection and listener
    pub event_channel_size: usize,
}

impl StreamConfig {
    /// Configuration with defaults for everything but the base URL
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            notifications_path: NOTIFICATIONS_STREAM_PATH.to_owned(),
            session_cookie: None,
            connect_timeout_secs: SSE_CONNECT_TIMEOUT_SECS,
            retry_initial_ms: SSE_DEFAULT_RETRY_MS,
            retry_max_ms: SSE_MAX_RETRY_MS,
            event_channel_size: SSE_EVENT_CHANNEL_SIZE,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `AKAZA_API_BASE_URL` is missing or not an absolute
    /// http(s) URL
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with_base_url(None)
    }

    /// Load configuration from environment variables, preferring `base_url` when given
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL is available or it is not an absolute
    /// http(s) URL
    pub fn from_env_with_base_url(base_url: Option<&str>) -> AppResult<Self> {
        let raw = match base_url {
            Some(raw) => raw.to_owned(),
            None => env::var(BASE_URL_ENV).map_err(|_| AppError::config_missing(BASE_URL_ENV))?,
        };
        let mut config = Self::new(parse_base_url(&raw)?);

        if let Ok(path) = env::var("AKAZA_NOTIFICATIONS_PATH") {
            if !path.trim().is_empty() {
                config.notifications_path = path;
            }
        }
        config.session_cookie = env::var("AKAZA_SESSION_COOKIE")
            .ok()
            .filter(|cookie| !cookie.trim().is_empty());
        config.connect_timeout_secs =
            env_parse_or("SSE_CONNECT_TIMEOUT_SECS", SSE_CONNECT_TIMEOUT_SECS);
        config.retry_initial_ms = env_parse_or("SSE_RETRY_INITIAL_MS", SSE_DEFAULT_RETRY_MS);
        config.retry_max_ms = env_parse_or("SSE_RETRY_MAX_MS", SSE_MAX_RETRY_MS);
        config.event_channel_size = env_parse_or("SSE_EVENT_CHANNEL_SIZE", SSE_EVENT_CHANNEL_SIZE);

        Ok(config)
    }

    /// Full push endpoint URL: base URL followed by the notifications path
    ///
    /// # Errors
    ///
    /// Returns an error if the combined URL does not parse
    pub fn endpoint_url(&self) -> AppResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = self.notifications_path.trim();
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).map_err(|e| {
            AppError::config_invalid(format!("Invalid notifications endpoint '{joined}': {e}"))
                .with_source(e)
        })
    }

    /// Options for the push connection
    #[must_use]
    pub fn event_source_options(&self) -> EventSourceOptions {
        EventSourceOptions {
            reconnect: ReconnectPolicy {
                initial_delay_ms: self.retry_initial_ms,
                max_delay_ms: self.retry_max_ms.max(self.retry_initial_ms),
                jitter: true,
            },
            channel_size: self.event_channel_size,
        }
    }

    /// HTTP client for the push connection
    ///
    /// Cookies set by the server are kept and the configured session cookie is
    /// sent with every request. No overall request timeout is set because the
    /// response body is long-lived.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cookie is not a valid header value or
    /// the client cannot be built
    pub fn build_http_client(&self) -> AppResult<Client> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| {
                AppError::config_invalid("AKAZA_SESSION_COOKIE is not a valid header value")
                    .with_source(e)
            })?;
            headers.insert(COOKIE, value);
        }

        Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")).with_source(e))
    }
}

/// Parse and validate an API base URL
///
/// # Errors
///
/// Returns an error unless `raw` is an absolute `http` or `https` URL with a host
pub fn parse_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        AppError::config_invalid(format!("{BASE_URL_ENV} '{raw}' is not a valid URL: {e}"))
            .with_source(e)
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(AppError::config_invalid(format!(
            "{BASE_URL_ENV} '{raw}' must be an absolute http(s) URL"
        )));
    }

    Ok(url)
}

fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_endpoint_url_joins_path() {
        let config = StreamConfig::new(Url::parse("https://api.akaza.io/v1/").unwrap());
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "https://api.akaza.io/v1/notifications/stream"
        );
    }

    #[test]
    fn test_endpoint_url_without_leading_slash() {
        let mut config = StreamConfig::new(Url::parse("http://localhost:8080").unwrap());
        config.notifications_path = "events".to_owned();
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "http://localhost:8080/events"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_relative_and_other_schemes() {
        assert_eq!(
            parse_base_url("/api").unwrap_err().code,
            ErrorCode::ConfigInvalid
        );
        assert_eq!(
            parse_base_url("ftp://example.com").unwrap_err().code,
            ErrorCode::ConfigInvalid
        );
        assert!(parse_base_url(" https://example.com ").is_ok());
    }

    #[test]
    fn test_invalid_cookie_rejected() {
        let mut config = StreamConfig::new(Url::parse("http://localhost").unwrap());
        config.session_cookie = Some("sid=abc\nevil".to_owned());
        assert_eq!(
            config.build_http_client().unwrap_err().code,
            ErrorCode::ConfigInvalid
        );
    }

    #[test]
    fn test_event_source_options_never_cap_below_initial() {
        let mut config = StreamConfig::new(Url::parse("http://localhost").unwrap());
        config.retry_initial_ms = 5000;
        config.retry_max_ms = 1000;
        let options = config.event_source_options();
        assert_eq!(options.reconnect.max_delay_ms, 5000);
    }
}
