// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Wildcard or explicit origin lists; per-router method sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! CORS layers.
//!
//! The detection endpoint accepts cross-origin `POST` + `OPTIONS`; the
//! community read endpoints accept `GET` + `OPTIONS`. Origins come from
//! `CORS_ALLOWED_ORIGINS` — wildcard by default, a comma-separated list in
//! locked-down deployments.

use http::{header::CONTENT_TYPE, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// CORS layer for the detection endpoint: `POST, OPTIONS`.
pub fn detect_cors(config: &CorsConfig) -> CorsLayer {
    base_layer(config).allow_methods([Method::POST, Method::OPTIONS])
}

/// CORS layer for the read-query endpoints: `GET, OPTIONS`.
pub fn read_cors(config: &CorsConfig) -> CorsLayer {
    base_layer(config).allow_methods([Method::GET, Method::OPTIONS])
}

fn base_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(parse_origins(&config.allowed_origins))
        .allow_headers([CONTENT_TYPE])
}

/// Parse the configured origin policy.
///
/// Empty or `*` means any origin; otherwise a comma-separated list, with
/// unparsable entries dropped. A list that parses to nothing falls back to
/// any origin rather than silently blocking every caller.
fn parse_origins(allowed_origins: &str) -> AllowOrigin {
    if allowed_origins.is_empty() || allowed_origins == "*" {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                None
            } else {
                HeaderValue::from_str(trimmed).ok()
            }
        })
        .collect();

    if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    }
}
