// ABOUTME: Re-export of the unified error types from akaza-core
// ABOUTME: Keeps `crate::errors` paths stable for the library and binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use akaza_core::errors::*;
