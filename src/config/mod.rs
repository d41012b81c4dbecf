// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-sourced, read once at startup, immutable afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Configuration module.
//!
//! All configuration is environment-sourced and read exactly once at process
//! start into a [`environment::ServerConfig`]; nothing reloads at runtime.

/// Environment and server configuration
pub mod environment;

pub use environment::{CorsConfig, HttpConfig, LogLevel, ServerConfig};
