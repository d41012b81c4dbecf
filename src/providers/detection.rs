// ABOUTME: Object-detection provider client posting base64 images for inference
// ABOUTME: Classifies transport failures into timeout, unreachable, and upstream errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Detection provider client.
//!
//! The provider is a black box: it takes a base64-encoded image and returns
//! axis-aligned boxes with a class label and confidence. [`RoboflowDetector`]
//! is the production implementation; the [`DetectionProvider`] trait is the
//! seam handlers depend on, with [`MockDetector`] standing in for tests.
//!
//! One attempt per request, no retries: the call is synchronous and
//! user-facing, so the caller resubmits on failure.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{BoundingBox, RawPrediction};
use crate::providers::http_client::shared_client;

/// Hard bound on one provider call.
pub const DETECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback image edge when the provider omits dimensions. Matches the
/// provider's canonical resize and keeps estimator denominators non-zero.
pub const DEFAULT_IMAGE_EDGE: u32 = 640;

/// Classified failures of one detection call.
#[derive(Debug, Clone, Error)]
pub enum DetectionError {
    /// No API key configured; surfaced before any socket is opened.
    #[error("detection provider API key is not configured")]
    MissingApiKey,

    /// The call exceeded [`DETECT_TIMEOUT`].
    #[error("detection provider call timed out")]
    Timeout,

    /// DNS or connection failure.
    #[error("detection provider unreachable: {0}")]
    Unreachable(String),

    /// Provider answered with a non-2xx status.
    #[error("detection provider returned HTTP {status} {status_text}")]
    Upstream { status: u16, status_text: String },

    /// Provider answered 2xx with an undecodable body.
    #[error("invalid detection provider response: {0}")]
    InvalidResponse(String),
}

/// Raw predictions plus the provider-reported image dimensions.
#[derive(Debug, Clone)]
pub struct Detections {
    pub predictions: Vec<RawPrediction>,
    pub image_width: u32,
    pub image_height: u32,
}

/// Seam between request handling and the external detection service.
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    /// Run inference on raw image bytes.
    async fn detect(&self, image: &[u8]) -> Result<Detections, DetectionError>;
}

/// Roboflow inference endpoint configuration.
#[derive(Debug, Clone)]
pub struct RoboflowConfig {
    /// API key; `None` makes every call fail fast with `MissingApiKey`
    pub api_key: Option<String>,
    /// Model identifier, e.g. `food-detection-ysgqf/2`
    pub model: String,
    /// Inference host
    pub base_url: String,
    /// Minimum confidence the provider should apply server-side, percent
    pub min_confidence_percent: u8,
    /// Maximum box overlap (IOU) the provider should apply, percent
    pub max_overlap_percent: u8,
}

impl Default for RoboflowConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "food-detection-ysgqf/2".to_string(),
            base_url: "https://detect.roboflow.com".to_string(),
            min_confidence_percent: 30,
            max_overlap_percent: 30,
        }
    }
}

/// Production detection client.
pub struct RoboflowDetector {
    config: RoboflowConfig,
}

impl RoboflowDetector {
    /// Create a detector with the given configuration.
    #[must_use]
    pub fn new(config: RoboflowConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl DetectionProvider for RoboflowDetector {
    async fn detect(&self, image: &[u8]) -> Result<Detections, DetectionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(DetectionError::MissingApiKey)?;

        let encoded = STANDARD.encode(image);
        debug!(
            image_bytes = image.len(),
            model = %self.config.model,
            "sending image to detection provider"
        );

        let response = shared_client()
            .post(self.endpoint())
            .query(&[
                ("api_key", api_key),
                (
                    "confidence",
                    &self.config.min_confidence_percent.to_string(),
                ),
                ("overlap", &self.config.max_overlap_percent.to_string()),
            ])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .timeout(DETECT_TIMEOUT)
            .body(encoded)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectionError::Upstream {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
            });
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;

        Ok(body.into_detections())
    }
}

fn classify_transport_error(error: reqwest::Error) -> DetectionError {
    if error.is_timeout() {
        DetectionError::Timeout
    } else {
        DetectionError::Unreachable(error.to_string())
    }
}

/// Wire shape of a successful inference response.
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    predictions: Vec<WirePrediction>,
    image: Option<WireImageSize>,
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    class: String,
    confidence: f64,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct WireImageSize {
    width: f64,
    height: f64,
}

impl InferenceResponse {
    fn into_detections(self) -> Detections {
        let (image_width, image_height) = self
            .image
            .map(|size| (sanitize_edge(size.width), sanitize_edge(size.height)))
            .unwrap_or((DEFAULT_IMAGE_EDGE, DEFAULT_IMAGE_EDGE));

        let predictions = self
            .predictions
            .into_iter()
            .map(|p| RawPrediction {
                label: p.class,
                confidence: p.confidence,
                bbox: BoundingBox {
                    x: p.x,
                    y: p.y,
                    width: p.width,
                    height: p.height,
                },
            })
            .collect();

        Detections {
            predictions,
            image_width,
            image_height,
        }
    }
}

/// Non-positive or absurd reported edges fall back to the canonical default.
fn sanitize_edge(edge: f64) -> u32 {
    if edge.is_finite() && edge >= 1.0 {
        edge.round() as u32
    } else {
        DEFAULT_IMAGE_EDGE
    }
}

/// Canned detector for exercising handlers without network access.
pub struct MockDetector {
    response: Result<Detections, DetectionError>,
}

impl MockDetector {
    /// Mock that yields the given predictions with the given dimensions.
    #[must_use]
    pub fn with_predictions(predictions: Vec<RawPrediction>, width: u32, height: u32) -> Self {
        Self {
            response: Ok(Detections {
                predictions,
                image_width: width,
                image_height: height,
            }),
        }
    }

    /// Mock that fails every call with the given error.
    #[must_use]
    pub fn failing_with(error: DetectionError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[async_trait]
impl DetectionProvider for MockDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Detections, DetectionError> {
        self.response.clone()
    }
}
