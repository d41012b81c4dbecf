// ABOUTME: Shared HTTP client with connection pooling for outbound collaborator calls
// ABOUTME: Singleton with a 30 second request timeout and 10 second connect timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Request timeout in seconds. The detection contract mandates a hard 30
/// second bound on the provider call; datastore reads inherit it.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection timeout in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Global shared HTTP client
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get the shared HTTP client for outbound collaborator calls.
///
/// The client pools connections across requests and applies the request and
/// connect timeouts to every call made through it.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
