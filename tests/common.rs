// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging setup, test server startup and subscriber polling helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `mcp_stream_hub`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::{Arc, Once};
use std::time::Duration;

use mcp_stream_hub::{
    client::McpStreamClient,
    config::{BackoffConfig, ClientConfig, ServerConfig, SseConfig},
    mcp::{InMemoryCatalog, McpService},
    server::{HubServer, ServerHandle},
    sse::BroadcastHub,
};
use url::Url;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
///
/// Set `TEST_LOG` to `TRACE`, `DEBUG`, `INFO` or `WARN` for more output.
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN") => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Upper bound for any single wait in a test
pub const TEST_WAIT: Duration = Duration::from_secs(5);

/// Server configuration bound to an ephemeral loopback port
pub fn test_server_config(heartbeat: Duration) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        http_port: 0,
        sse: SseConfig {
            heartbeat_interval: heartbeat,
            ..SseConfig::default()
        },
        shutdown_timeout: TEST_WAIT,
        ..ServerConfig::default()
    }
}

/// Start a hub over `service` on an ephemeral port
///
/// Keepalives are frequent so that dropped client connections surface quickly.
pub async fn start_server(service: Arc<dyn McpService>) -> ServerHandle {
    init_test_logging();
    HubServer::new(test_server_config(Duration::from_millis(100)), service)
        .start()
        .await
        .expect("Failed to start test server")
}

/// Start a hub over the demo catalog on an ephemeral port
pub async fn start_demo_server() -> ServerHandle {
    start_server(Arc::new(InMemoryCatalog::demo())).await
}

/// Client for `handle` that reconnects quickly
pub fn test_client(handle: &ServerHandle) -> McpStreamClient {
    let base_url = Url::parse(&handle.base_url()).expect("Invalid server URL");
    let config = ClientConfig {
        backoff: BackoffConfig {
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(200),
        },
        request_timeout: TEST_WAIT,
        ..ClientConfig::new(base_url)
    };
    McpStreamClient::new(config).expect("Failed to build client")
}

/// Poll until the hub holds exactly `expected` subscribers
pub async fn wait_for_subscribers(hub: &BroadcastHub, expected: usize) {
    let polled = tokio::time::timeout(TEST_WAIT, async {
        while hub.subscriber_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    assert!(
        polled.is_ok(),
        "expected {expected} subscribers, hub has {}",
        hub.subscriber_count()
    );
}
