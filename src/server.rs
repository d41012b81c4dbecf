// ABOUTME: Router assembly and HTTP server lifecycle with graceful shutdown
// ABOUTME: Merges domain routers, applies tracing, binds, and serves until signaled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Server assembly.
//!
//! [`build_router`] merges the domain routers and is the piece integration
//! tests drive directly; [`serve`] binds it and runs until SIGINT/SIGTERM.

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::resources::ServerResources;
use crate::routes::{CommunityRoutes, DetectRoutes, HealthRoutes};

/// Assemble the full application router.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(DetectRoutes::routes(resources.clone()))
        .merge(CommunityRoutes::routes(resources))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until a shutdown signal arrives.
pub async fn serve(resources: Arc<ServerResources>) -> Result<()> {
    let address = resources.config.http.bind_address();
    let app = build_router(resources);

    let listener = TcpListener::bind(&address).await?;
    info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
