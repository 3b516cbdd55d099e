// ABOUTME: Core data models for the Akaza notification pipeline
// ABOUTME: Re-exports Notification, its identifier, and the push payload wire types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Notification`: a decoded notification as held in memory
//! - `NotificationId`: string-or-number identifier used for read toggling
//! - `NotificationBatch`: the JSON payload carried by one push event

mod notification;

pub use notification::{
    decode_batch, parse_created_at, DedupKey, Notification, NotificationBatch, NotificationId,
    WireNotification,
};
