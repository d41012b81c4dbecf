// ABOUTME: Route module organization for Morsel API HTTP endpoints
// ABOUTME: Domain routers with thin handlers delegating to providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Route modules.
//!
//! Routes are organized by domain: the detection pipeline, the community
//! read-query endpoints, and the health surface. Each module exposes a
//! `routes()` constructor returning its `axum::Router`.

/// Community read-query routes (leaderboard, search, stats, profiles)
pub mod community;
/// Food detection upload route
pub mod detect;
/// Health check and readiness routes
pub mod health;

pub use community::CommunityRoutes;
pub use detect::DetectRoutes;
pub use health::HealthRoutes;
