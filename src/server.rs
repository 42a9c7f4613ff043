// ABOUTME: Hub server wiring: binds the listener, serves the router and hands back a shutdown handle
// ABOUTME: The handle exposes the bound address, the hub and the lifecycle controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::lifecycle::{LifecycleController, ShutdownOutcome};
use crate::mcp::{McpService, ServiceGateway};
use crate::routes::build_router;
use crate::sse::BroadcastHub;

/// Hub server ready to bind
pub struct HubServer {
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
    gateway: ServiceGateway,
}

impl HubServer {
    /// Server publishing the outcomes of `service` calls
    #[must_use]
    pub fn new(config: ServerConfig, service: Arc<dyn McpService>) -> Self {
        let hub = Arc::new(BroadcastHub::new(config.sse.subscriber_capacity));
        let gateway = ServiceGateway::new(service, Arc::clone(&hub));
        Self {
            config,
            hub,
            gateway,
        }
    }

    /// Broadcast hub shared by every route
    #[must_use]
    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    /// Router serving every endpoint
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.gateway.clone(), &self.config)
    }

    /// Bind the listener and start serving in a background task
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the address cannot be bound
    pub async fn start(self) -> AppResult<ServerHandle> {
        self.config.validate()?;
        info!("{}", self.config.summary());

        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::bind(format!("Cannot bind {address}")).with_source(e))?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let stop_accepting = CancellationToken::new();
        let stop_signal = stop_accepting.clone();
        let server_task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { stop_signal.cancelled().await })
                .await
        });

        info!(address = %local_addr, "MCP stream hub listening");
        let lifecycle = LifecycleController::new(Arc::clone(&self.hub), stop_accepting, server_task);

        Ok(ServerHandle {
            local_addr,
            hub: self.hub,
            lifecycle: Arc::new(lifecycle),
        })
    }
}

/// Handle to a running hub server
#[derive(Debug, Clone)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    hub: Arc<BroadcastHub>,
    lifecycle: Arc<LifecycleController>,
}

impl ServerHandle {
    /// Address the listener is bound to
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://` base URL for the bound address
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Broadcast hub of this server
    #[must_use]
    pub const fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Lifecycle controller of this server
    #[must_use]
    pub const fn lifecycle(&self) -> &Arc<LifecycleController> {
        &self.lifecycle
    }

    /// Run the ordered shutdown sequence
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownOutcome {
        self.lifecycle.shutdown(timeout).await
    }
}
