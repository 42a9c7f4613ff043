// ABOUTME: Hub server binary serving the demo catalog with SSE broadcasting
// ABOUTME: Loads configuration from the environment, serves until ctrl-c and shuts down in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # MCP Stream Hub Binary
//!
//! Starts the request/response API and the `/api/events` broadcast stream over
//! the built-in demo catalog.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use mcp_stream_hub::{
    config::ServerConfig,
    constants::{routes, service_names},
    lifecycle::ShutdownOutcome,
    logging,
    mcp::InMemoryCatalog,
    server::HubServer,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mcp-stream-hub")]
#[command(about = "MCP prompt/tool/resource API with a real-time SSE broadcast hub")]
struct Args {
    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override keepalive interval in seconds
    #[arg(long)]
    heartbeat_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env(service_names::MCP_STREAM_HUB)?;

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(heartbeat_secs) = args.heartbeat_secs {
        config.sse.heartbeat_interval = Duration::from_secs(heartbeat_secs);
    }
    let shutdown_timeout = config.shutdown_timeout;

    let handle = HubServer::new(config, Arc::new(InMemoryCatalog::demo()))
        .start()
        .await?;
    display_available_endpoints(&handle.base_url());

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received; shutting down");

    match handle.shutdown(shutdown_timeout).await {
        ShutdownOutcome::TimedOut { closed_subscribers } => warn!(
            closed_subscribers,
            "Shutdown deadline elapsed before all connections drained"
        ),
        outcome => info!(outcome = ?outcome, "Shutdown complete"),
    }

    Ok(())
}

#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(base_url: &str) {
    info!("=== Available API Endpoints ===");
    info!("   Event stream:    GET  {base_url}{}", routes::EVENTS);
    info!("   List prompts:    GET  {base_url}{}", routes::PROMPTS);
    info!("   Get prompt:      POST {base_url}{}", routes::PROMPTS_GET);
    info!("   List tools:      GET  {base_url}{}", routes::TOOLS);
    info!("   Call tool:       POST {base_url}{}", routes::TOOLS_CALL);
    info!("   List resources:  GET  {base_url}{}", routes::RESOURCES);
    info!("   Read resource:   POST {base_url}{}", routes::RESOURCES_READ);
    info!("   Health:          GET  {base_url}{}", routes::HEALTH);
    info!("=== End of Endpoint List ===");
}
