// ABOUTME: Tests for environment-driven server and client configuration
// ABOUTME: Serialized because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use mcp_stream_hub::config::{ClientConfig, ServerConfig};
use mcp_stream_hub::errors::ErrorCode;
use serial_test::serial;

const SERVER_VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "SSE_SUBSCRIBER_CAPACITY",
    "SSE_HEARTBEAT_SECS",
    "SHUTDOWN_TIMEOUT_SECS",
    "CORS_ORIGINS",
];

const CLIENT_VARS: &[&str] = &[
    "MCP_STREAM_URL",
    "CLIENT_EVENT_QUEUE_CAPACITY",
    "CLIENT_REQUEST_TIMEOUT_SECS",
    "CLIENT_RECONNECT_INITIAL_MS",
    "CLIENT_RECONNECT_MAX_MS",
];

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_server_defaults_when_unset() {
    clear(SERVER_VARS);

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.sse.subscriber_capacity, 10);
    assert_eq!(config.sse.heartbeat_interval, Duration::from_secs(30));
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
}

#[test]
#[serial]
fn test_server_overrides_and_origin_list() {
    clear(SERVER_VARS);
    env::set_var("HTTP_PORT", "9090");
    env::set_var("SSE_SUBSCRIBER_CAPACITY", "32");
    env::set_var("SSE_HEARTBEAT_SECS", "5");
    env::set_var("CORS_ORIGINS", "http://a.test, http://b.test,");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 9090);
    assert_eq!(config.sse.subscriber_capacity, 32);
    assert_eq!(config.sse.heartbeat_interval, Duration::from_secs(5));
    assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);

    clear(SERVER_VARS);
}

#[test]
#[serial]
fn test_server_rejects_bad_values() {
    clear(SERVER_VARS);

    env::set_var("HTTP_PORT", "not-a-port");
    let error = ServerConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("HTTP_PORT"));

    clear(SERVER_VARS);
    env::set_var("SSE_SUBSCRIBER_CAPACITY", "0");
    assert_eq!(
        ServerConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    clear(SERVER_VARS);
}

#[test]
#[serial]
fn test_client_overrides() {
    clear(CLIENT_VARS);
    env::set_var("MCP_STREAM_URL", "http://hub.test:9000/prefix");
    env::set_var("CLIENT_RECONNECT_INITIAL_MS", "100");
    env::set_var("CLIENT_RECONNECT_MAX_MS", "800");

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.base_url.as_str(), "http://hub.test:9000/prefix");
    assert_eq!(config.backoff.initial_delay, Duration::from_millis(100));
    assert_eq!(config.backoff.max_delay, Duration::from_millis(800));
    assert_eq!(config.event_queue_capacity, 100);

    clear(CLIENT_VARS);
}

#[test]
#[serial]
fn test_client_rejects_inverted_backoff_and_bad_url() {
    clear(CLIENT_VARS);
    env::set_var("CLIENT_RECONNECT_INITIAL_MS", "5000");
    env::set_var("CLIENT_RECONNECT_MAX_MS", "100");
    assert_eq!(
        ClientConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    clear(CLIENT_VARS);
    env::set_var("MCP_STREAM_URL", "not a url");
    assert_eq!(
        ClientConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    clear(CLIENT_VARS);
}
