// ABOUTME: Main library entry point for the Morsel food API
// ABOUTME: Food photo detection pipeline plus community read-query endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

#![deny(unsafe_code)]

//! # Morsel Food API
//!
//! HTTP API that turns food photographs into structured, categorized food
//! item records. An uploaded image is forwarded to an external
//! object-detection provider; raw predictions come back as bounding boxes
//! with class labels, get classified into food categories, sized into gram
//! estimates, and returned as one JSON item list. A second set of endpoints
//! serves public community reads (leaderboard, search, stats, profiles) from
//! a managed datastore.
//!
//! ## Architecture
//!
//! - **multipart**: manual byte-level decoder for image uploads
//! - **providers**: external collaborators — detection inference and
//!   datastore reads — behind trait seams
//! - **classify / quantity / assemble**: the pure transformation pipeline
//! - **routes**: axum handlers orchestrating the above
//! - **errors**: unified error codes and the JSON failure envelope
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use morsel_api::config::environment::ServerConfig;
//! use morsel_api::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env();
//!     let resources = Arc::new(ServerResources::from_config(config));
//!     morsel_api::server::serve(resources).await
//! }
//! ```

/// Result assembly: filtering, naming, and item construction
pub mod assemble;
/// Keyword-based food category classification
pub mod classify;
/// Environment-sourced configuration
pub mod config;
/// Unified error codes and the JSON failure envelope
pub mod errors;
/// Structured logging setup
pub mod logging;
/// HTTP middleware (CORS)
pub mod middleware;
/// Domain models for predictions, items, and responses
pub mod models;
/// Manual multipart/form-data decoding
pub mod multipart;
/// External collaborator clients (detection provider, datastore)
pub mod providers;
/// Bounding-box based quantity estimation
pub mod quantity;
/// Shared server resources
pub mod resources;
/// HTTP route handlers
pub mod routes;
/// Router assembly and server lifecycle
pub mod server;
