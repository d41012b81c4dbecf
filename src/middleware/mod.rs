// ABOUTME: HTTP middleware for cross-origin request handling
// ABOUTME: Builds per-router CORS layers from the configured origin policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

pub mod cors;

pub use cors::{detect_cors, read_cors};
