// ABOUTME: HTTP route for the subscription stream
// ABOUTME: Sets streaming headers and hands each connection its own hub registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::{sse::Sse, IntoResponse};
use axum::routing::get;
use axum::Router;
use tracing::info;

use super::handler::subscription_stream;
use super::hub::BroadcastHub;
use crate::constants::routes;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

#[derive(Clone)]
struct SseState {
    hub: Arc<BroadcastHub>,
    heartbeat: Duration,
}

/// Subscription stream routes
pub struct SseRoutes;

impl SseRoutes {
    /// Create the `GET /api/events` route
    pub fn routes(hub: Arc<BroadcastHub>, heartbeat: Duration) -> Router {
        Router::new()
            .route(routes::EVENTS, get(Self::handle_subscribe))
            .with_state(SseState { hub, heartbeat })
    }

    async fn handle_subscribe(State(state): State<SseState>) -> impl IntoResponse {
        info!("New event stream subscriber");
        let stream = subscription_stream(state.hub, state.heartbeat);

        (
            [
                (CONTENT_TYPE, "text/event-stream"),
                (CACHE_CONTROL, "no-cache"),
                (CONNECTION, "keep-alive"),
                (X_ACCEL_BUFFERING, "no"),
                (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            Sse::new(stream),
        )
    }
}
