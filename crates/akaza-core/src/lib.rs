// ABOUTME: Core types and constants for the Akaza notification pipeline
// ABOUTME: Foundation crate with error handling, notification models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Akaza Core
//!
//! Foundation crate providing shared types and constants for the Akaza
//! notification pipeline. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Buffer limits, wire paths, and reconnection defaults
//! - **models**: `Notification` and the push payload wire types

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Notification data models and wire payloads
pub mod models;
