// ABOUTME: Unified error handling with stable error codes and HTTP status mapping
// ABOUTME: Converts module-level failures into the JSON error envelope at the boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! # Unified Error Handling
//!
//! Every failure in the pipeline converges on [`AppError`]: a stable
//! [`ErrorCode`], a human-readable message, and (for propagated upstream
//! failures) the upstream status. Handlers return `Result<_, AppError>` and
//! the `IntoResponse` impl serializes the error envelope — nothing escapes as
//! an unstructured failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::multipart::MultipartError;
use crate::providers::datastore::DatastoreError;
use crate::providers::detection::DetectionError;

/// Stable error codes carried in the failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Request decoding (4xx)
    #[serde(rename = "MALFORMED_REQUEST")]
    MalformedRequest,
    #[serde(rename = "PAYLOAD_TOO_LARGE")]
    PayloadTooLarge,
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    #[serde(rename = "PROFILE_PRIVATE")]
    ProfilePrivate,

    // Upstream collaborators (5xx / propagated)
    #[serde(rename = "UPSTREAM_TIMEOUT")]
    UpstreamTimeout,
    #[serde(rename = "UPSTREAM_UNREACHABLE")]
    UpstreamUnreachable,
    #[serde(rename = "UPSTREAM_ERROR")]
    UpstreamError,

    // Configuration and internal (500)
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Default HTTP status for this code. `UpstreamError` responses override
    /// this with the propagated provider status.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::MalformedRequest | Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ProfilePrivate => StatusCode::FORBIDDEN,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnreachable => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::ConfigMissing | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short description used when no more specific message exists.
    pub fn description(self) -> &'static str {
        match self {
            Self::MalformedRequest => "The request body could not be decoded",
            Self::PayloadTooLarge => "The uploaded payload exceeds the size limit",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ProfilePrivate => "This profile is private",
            Self::UpstreamTimeout => "The upstream service did not answer in time",
            Self::UpstreamUnreachable => "The upstream service could not be reached",
            Self::UpstreamError => "The upstream service returned an error",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application.
#[derive(Debug, Error)]
pub struct AppError {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message for the envelope's `error` field
    pub message: String,
    /// Optional extra detail for the envelope's `details` field
    pub details: Option<String>,
    /// Upstream status to propagate instead of the code's default
    pub upstream_status: Option<u16>,
}

impl AppError {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            upstream_status: None,
        }
    }

    /// Attach extra detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Malformed request body or headers.
    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRequest, message)
    }

    /// Invalid query or path input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Missing required configuration.
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// Unexpected internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Upstream non-2xx with propagated status.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorCode::UpstreamError, message);
        err.upstream_status = Some(status);
        err
    }

    /// Resolved HTTP status: propagated upstream status when present and
    /// valid, the code's default otherwise.
    pub fn http_status(&self) -> StatusCode {
        self.upstream_status
            .and_then(|status| StatusCode::from_u16(status).ok())
            .unwrap_or_else(|| self.code.http_status())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience.
pub type AppResult<T> = Result<T, AppError>;

/// JSON failure envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub code: ErrorCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for ErrorEnvelope {
    fn from(error: &AppError) -> Self {
        Self {
            success: false,
            code: error.code,
            error: error.message.clone(),
            details: error.details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let envelope = ErrorEnvelope::from(&self);
        (status, Json(envelope)).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        match error {
            MultipartError::PayloadTooLarge => {
                Self::new(ErrorCode::PayloadTooLarge, error.to_string())
            }
            MultipartError::FieldNotFound(field) => {
                Self::malformed_request(format!("No {field} provided"))
            }
            MultipartError::NoBoundary | MultipartError::MissingHeaderDelimiter => {
                Self::malformed_request(error.to_string())
            }
        }
    }
}

impl From<DetectionError> for AppError {
    fn from(error: DetectionError) -> Self {
        match error {
            DetectionError::MissingApiKey => {
                Self::config_missing("Detection provider API key is not configured")
            }
            DetectionError::Timeout => Self::new(
                ErrorCode::UpstreamTimeout,
                "Detection provider did not answer within 30 seconds",
            ),
            DetectionError::Unreachable(detail) => {
                Self::new(ErrorCode::UpstreamUnreachable, "Detection provider unreachable")
                    .with_details(detail)
            }
            DetectionError::Upstream {
                status,
                status_text,
            } => Self::upstream(
                status,
                format!("Detection provider returned HTTP {status}"),
            )
            .with_details(status_text),
            DetectionError::InvalidResponse(detail) => {
                Self::internal("Detection provider returned an undecodable response")
                    .with_details(detail)
            }
        }
    }
}

impl From<DatastoreError> for AppError {
    fn from(error: DatastoreError) -> Self {
        match error {
            DatastoreError::NotConfigured => {
                Self::config_missing("Datastore credentials are not configured")
            }
            DatastoreError::Timeout => {
                Self::new(ErrorCode::UpstreamTimeout, "Datastore did not answer in time")
            }
            DatastoreError::Unreachable(detail) => {
                Self::new(ErrorCode::UpstreamUnreachable, "Datastore unreachable")
                    .with_details(detail)
            }
            DatastoreError::Upstream { status, body } => {
                Self::upstream(status, format!("Datastore returned HTTP {status}"))
                    .with_details(body)
            }
            DatastoreError::InvalidResponse(detail) => {
                Self::internal("Datastore returned an undecodable response").with_details(detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_status_mapping() {
        assert_eq!(
            ErrorCode::MalformedRequest.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PayloadTooLarge.http_status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::UpstreamTimeout.http_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ErrorCode::UpstreamUnreachable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::ConfigMissing.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_status_propagates() {
        let error = AppError::upstream(404, "Detection provider returned HTTP 404");
        assert_eq!(error.http_status(), StatusCode::NOT_FOUND);

        // Out-of-range upstream status falls back to the code's default.
        let invalid = AppError::upstream(42, "bogus status");
        assert_eq!(invalid.http_status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn envelope_serialization() {
        let error = AppError::malformed_request("No image provided");
        let envelope = ErrorEnvelope::from(&error);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("MALFORMED_REQUEST"));
        assert!(json.contains("No image provided"));
        assert!(!json.contains("details"));
    }
}
