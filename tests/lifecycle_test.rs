// ABOUTME: End-to-end shutdown tests against a server bound to a loopback port
// ABOUTME: Verifies ordered shutdown with live subscribers, idempotence and listener teardown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use mcp_stream_core::SseLineBuffer;
use mcp_stream_hub::lifecycle::{LifecycleState, ShutdownOutcome};

// ============================================================================
// Ordered Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_with_open_streams_completes_before_deadline() {
    let handle = common::start_demo_server().await;
    let events_url = format!("{}/api/events", handle.base_url());

    let http = reqwest::Client::new();
    let mut streams = Vec::new();
    for _ in 0..3 {
        let response = http.get(&events_url).send().await.unwrap();
        assert!(response.status().is_success());
        streams.push(response.bytes_stream());
    }
    common::wait_for_subscribers(handle.hub(), 3).await;

    let started = Instant::now();
    let outcome = handle.shutdown(common::TEST_WAIT).await;

    assert_eq!(
        outcome,
        ShutdownOutcome::Completed {
            closed_subscribers: 3
        }
    );
    assert!(started.elapsed() < common::TEST_WAIT);
    assert_eq!(handle.lifecycle().state(), LifecycleState::ShutDown);

    // Every stream delivered its sentinel and then ended
    for mut body in streams {
        let mut parser = SseLineBuffer::new();
        let mut frames = Vec::new();
        let drained = tokio::time::timeout(common::TEST_WAIT, async {
            while let Some(Ok(chunk)) = body.next().await {
                frames.extend(parser.feed(&chunk));
            }
        })
        .await;
        assert!(drained.is_ok(), "stream stayed open after shutdown");
        assert!(frames.first().is_some_and(mcp_stream_core::SseFrame::is_connected));
    }
}

#[tokio::test]
async fn test_second_shutdown_is_a_no_op() {
    let handle = common::start_demo_server().await;

    let first = handle.shutdown(Duration::from_secs(2)).await;
    assert_eq!(
        first,
        ShutdownOutcome::Completed {
            closed_subscribers: 0
        }
    );

    let second = handle.shutdown(Duration::from_secs(2)).await;
    assert_eq!(second, ShutdownOutcome::AlreadyShutDown);
    assert_eq!(handle.lifecycle().state(), LifecycleState::ShutDown);
}

#[tokio::test]
async fn test_listener_refuses_connections_after_shutdown() {
    let handle = common::start_demo_server().await;
    let health_url = format!("{}/health", handle.base_url());

    let response = reqwest::get(&health_url).await.unwrap();
    assert!(response.status().is_success());

    handle.shutdown(common::TEST_WAIT).await;

    let fresh = reqwest::Client::new();
    assert!(fresh.get(&health_url).send().await.is_err());
    assert!(handle.hub().is_closed());
}

#[tokio::test]
async fn test_concurrent_shutdown_requests_run_sequence_once() {
    let handle = common::start_demo_server().await;

    let (a, b) = tokio::join!(
        handle.shutdown(common::TEST_WAIT),
        handle.shutdown(common::TEST_WAIT)
    );

    let completed = [a, b]
        .iter()
        .filter(|outcome| matches!(outcome, ShutdownOutcome::Completed { .. }))
        .count();
    assert_eq!(completed, 1);
    assert!([a, b].contains(&ShutdownOutcome::AlreadyShutDown));
}
