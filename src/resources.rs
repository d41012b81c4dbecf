// ABOUTME: Shared server resources constructed once at startup
// ABOUTME: Read-only config plus provider handles, shared behind Arc across requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Shared server state.
//!
//! One [`ServerResources`] is built at startup and handed to every router as
//! `Arc` state. Nothing in it is mutable: concurrent requests share
//! configuration and pooled clients, never data.

use std::sync::Arc;

use crate::config::environment::ServerConfig;
use crate::providers::datastore::{ProfileStore, SupabaseStore};
use crate::providers::detection::{DetectionProvider, RoboflowDetector};

/// Immutable bundle of everything request handlers need.
pub struct ServerResources {
    /// Startup configuration
    pub config: ServerConfig,
    /// Detection provider seam
    pub detector: Arc<dyn DetectionProvider>,
    /// Datastore seam
    pub profiles: Arc<dyn ProfileStore>,
}

impl ServerResources {
    /// Wire production providers from configuration.
    #[must_use]
    pub fn from_config(config: ServerConfig) -> Self {
        let detector = Arc::new(RoboflowDetector::new(config.detection.clone()));
        let profiles = Arc::new(SupabaseStore::new(config.datastore.clone()));
        Self {
            config,
            detector,
            profiles,
        }
    }

    /// Wire explicit providers; the seam tests and alternative deployments
    /// use to swap implementations.
    #[must_use]
    pub fn with_providers(
        config: ServerConfig,
        detector: Arc<dyn DetectionProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            config,
            detector,
            profiles,
        }
    }
}
