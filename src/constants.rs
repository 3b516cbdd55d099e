// ABOUTME: Re-export of application constants from akaza-core
// ABOUTME: Keeps `crate::constants` paths stable for the library and binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use akaza_core::constants::*;
