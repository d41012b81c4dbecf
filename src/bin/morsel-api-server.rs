// ABOUTME: Server binary wiring configuration, logging, and the HTTP listener
// ABOUTME: Loads env config, applies CLI overrides, and serves until signaled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! # Morsel API Server Binary
//!
//! Starts the food detection and community API. All configuration comes from
//! the environment; the few flags below exist for local overrides.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use morsel_api::config::environment::ServerConfig;
use morsel_api::logging;
use morsel_api::resources::ServerResources;
use morsel_api::server;

#[derive(Parser)]
#[command(name = "morsel-api-server")]
#[command(about = "Morsel Food API - food photo detection and community stats")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env();
    if let Some(port) = args.http_port {
        config.http.port = port;
    }
    if let Some(host) = args.host {
        config.http.host = host;
    }

    logging::init(config.log_level)?;

    info!("Starting Morsel Food API");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config));
    server::serve(resources).await
}
