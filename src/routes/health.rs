// ABOUTME: Health check route reporting liveness and broadcast hub statistics
// ABOUTME: Exposes subscriber count and dropped event total for monitoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::constants::{routes, service_names};
use crate::sse::BroadcastHub;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(hub: Arc<BroadcastHub>) -> Router {
        async fn health_handler(State(hub): State<Arc<BroadcastHub>>) -> Json<Value> {
            let status = if hub.is_closed() { "shutting_down" } else { "healthy" };
            Json(json!({
                "status": status,
                "service": service_names::MCP_STREAM_HUB,
                "version": env!("CARGO_PKG_VERSION"),
                "subscribers": hub.subscriber_count(),
                "droppedEvents": hub.dropped_events(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new()
            .route(routes::HEALTH, get(health_handler))
            .with_state(hub)
    }
}
