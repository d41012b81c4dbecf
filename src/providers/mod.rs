// ABOUTME: External collaborator clients for detection and the managed datastore
// ABOUTME: Trait seams with production HTTP implementations and a mock detector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! External collaborators.
//!
//! Both outbound dependencies — the object-detection provider and the managed
//! datastore — are reached over HTTP through trait seams, so handlers depend
//! on behavior, not transport. Production implementations share one pooled
//! HTTP client.

/// Managed datastore read queries (profiles, achievements, waste logs)
pub mod datastore;
/// Object-detection provider client
pub mod detection;
/// Shared pooled HTTP client for outbound calls
pub mod http_client;

pub use datastore::{DatastoreError, ProfileStore, SupabaseStore};
pub use detection::{DetectionError, DetectionProvider, Detections, MockDetector, RoboflowDetector};
pub use http_client::shared_client;
