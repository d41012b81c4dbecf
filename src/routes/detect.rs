// ABOUTME: Food detection route accepting multipart image uploads
// ABOUTME: Decodes the upload, calls the detection provider, assembles the item list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Detection route.
//!
//! `POST /detect-food` runs the whole pipeline for one photograph: decode the
//! multipart upload, hand the image to the detection provider, classify and
//! size each prediction, and answer with the assembled item list. Every
//! failure converts to the structured error envelope; a failed request leaves
//! nothing behind for the next one.

use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assemble::assemble_items;
use crate::errors::AppError;
use crate::middleware::cors::detect_cors;
use crate::models::{DetectionResponse, ImageSize};
use crate::multipart::{self, MAX_PAYLOAD_BYTES};
use crate::providers::detection::DetectionProvider as _;
use crate::resources::ServerResources;

/// Extra room on top of the payload cap for multipart framing (boundary
/// lines, part headers). The decoder enforces the exact cap; this bound only
/// stops unbounded buffering.
const FRAMING_ALLOWANCE_BYTES: usize = 64 * 1024;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Detection route handlers.
pub struct DetectRoutes;

impl DetectRoutes {
    /// Create the detection router.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let cors = detect_cors(&resources.config.cors);

        Router::new()
            .route(
                "/detect-food",
                post(Self::handle_detect).options(Self::handle_preflight),
            )
            .layer(DefaultBodyLimit::max(
                MAX_PAYLOAD_BYTES + FRAMING_ALLOWANCE_BYTES,
            ))
            .layer(cors)
            .with_state(resources)
    }

    /// Bare OPTIONS short-circuits to 200 with no body. Preflights with CORS
    /// request headers are answered by the CORS layer before reaching this.
    async fn handle_preflight() -> StatusCode {
        StatusCode::OK
    }

    /// Run the detection pipeline for one uploaded photograph.
    async fn handle_detect(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::malformed_request("Missing content-type header"))?;

        let image = multipart::extract_field(content_type, &body, IMAGE_FIELD)?;
        info!(image_bytes = image.len(), "image decoded, running detection");

        let detections = resources.detector.detect(&image).await.map_err(|error| {
            warn!(%error, "detection call failed");
            error
        })?;

        let items = assemble_items(
            &detections.predictions,
            detections.image_width,
            detections.image_height,
        );
        info!(
            predictions = detections.predictions.len(),
            items = items.len(),
            "detection complete"
        );

        let response = DetectionResponse::new(
            items,
            ImageSize {
                width: detections.image_width,
                height: detections.image_height,
            },
        );
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
