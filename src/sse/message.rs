// ABOUTME: Message events handed from the push connection to its single listener
// ABOUTME: Maps decoded event-stream frames onto the fields an EventSource listener sees
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use eventsource_stream::Event;

use crate::constants::wire::DEFAULT_EVENT_TYPE;

/// A dispatched message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Event type (`message` when the stream sent no `event:` field)
    pub event_type: String,
    /// Joined `data:` payload
    pub data: String,
    /// Last event id seen on the connection when this event was dispatched
    pub last_event_id: String,
}

impl MessageEvent {
    /// Map a decoded frame, falling back to `last_event_id` when the frame
    /// carries no id of its own
    ///
    /// The fallback carries the id across reconnects, where the decoder starts
    /// from an empty id.
    #[must_use]
    pub fn resumed(event: Event, last_event_id: &str) -> Self {
        let last_event_id = if event.id.is_empty() {
            last_event_id.to_owned()
        } else {
            event.id
        };
        let event_type = if event.event.is_empty() {
            DEFAULT_EVENT_TYPE.to_owned()
        } else {
            event.event
        };

        Self {
            event_type,
            data: event.data,
            last_event_id,
        }
    }

    /// Whether this event goes to plain `message` listeners
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.event_type == DEFAULT_EVENT_TYPE
    }
}

impl From<Event> for MessageEvent {
    fn from(event: Event) -> Self {
        Self::resumed(event, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event: &str, data: &str, id: &str) -> Event {
        Event {
            event: event.to_owned(),
            data: data.to_owned(),
            id: id.to_owned(),
            retry: None,
        }
    }

    #[test]
    fn test_frame_id_wins_over_resumed_id() {
        let message = MessageEvent::resumed(event("message", "x", "8"), "7");
        assert_eq!(message.last_event_id, "8");
    }

    #[test]
    fn test_resumed_id_fills_missing_frame_id() {
        let message = MessageEvent::resumed(event("message", "x", ""), "7");
        assert_eq!(message.last_event_id, "7");
        assert!(message.is_message());
    }

    #[test]
    fn test_named_event_is_not_a_message() {
        let message = MessageEvent::from(event("heartbeat", "ok", ""));
        assert_eq!(message.event_type, "heartbeat");
        assert!(!message.is_message());
    }

    #[test]
    fn test_empty_event_type_defaults_to_message() {
        assert!(MessageEvent::from(event("", "x", "")).is_message());
    }
}
