// ABOUTME: Server-Sent Events broadcasting for MCP call results
// ABOUTME: Hub registry, per-connection subscription stream and the HTTP route serving it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Subscriber registry and fan-out
pub mod hub;

/// Per-connection subscription stream
pub mod handler;

/// `GET /api/events`
pub mod routes;

pub use handler::{subscription_stream, CloseReason, SubscriptionGuard};
pub use hub::{BroadcastHub, SubscriberHandle, SubscriberId};
pub use routes::SseRoutes;
