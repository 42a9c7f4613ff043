// ABOUTME: Route module organization for the MCP stream hub HTTP endpoints
// ABOUTME: Assembles API, subscription stream and health routes with their middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route module
//!
//! Each domain module holds route definitions and thin handlers that delegate
//! to the gateway or the hub. [`build_router`] assembles them.

/// Prompt, tool and resource endpoints
pub mod api;
/// Health check and hub statistics
pub mod health;

use std::sync::Arc;

use axum::http::Uri;
use axum::Router;

pub use api::ApiRoutes;
pub use health::HealthRoutes;

use crate::config::ServerConfig;
use crate::errors::AppError;
use crate::mcp::ServiceGateway;
use crate::middleware::{request_tracing, setup_cors};
use crate::sse::SseRoutes;

/// Build the complete router for one hub
pub fn build_router(gateway: ServiceGateway, config: &ServerConfig) -> Router {
    let hub = Arc::clone(gateway.hub());

    let api = ApiRoutes::routes(gateway)
        .merge(HealthRoutes::routes(Arc::clone(&hub)))
        .layer(setup_cors(config));

    Router::new()
        .merge(api)
        .merge(SseRoutes::routes(hub, config.sse.heartbeat_interval))
        .fallback(route_not_found)
        .layer(request_tracing())
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::route_not_found(format!("no route for {}", uri.path()))
}
