// ABOUTME: Application constants grouped by domain
// ABOUTME: Default capacities, intervals, ports and route paths for hub and client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Defaults here are overridable through the environment (see
//! [`crate::config::environment`]); route paths are fixed and shared by the
//! router and the client so both sides stay in sync.

/// Service identification
pub mod service_names {
    /// Name used in logs and the health endpoint
    pub const MCP_STREAM_HUB: &str = "mcp-stream-hub";
    /// Name of the client CLI
    pub const MCP_STREAM_CLIENT: &str = "mcp-stream-client";
}

/// Server defaults
pub mod server_defaults {
    /// Bind address
    pub const HOST: &str = "0.0.0.0";
    /// HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Upper bound on graceful shutdown, in seconds
    pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
}

/// Subscription stream defaults
pub mod sse_defaults {
    /// Pending events per subscriber before new ones are dropped
    pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 10;
    /// Seconds between keepalive comments
    pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;
}

/// Client defaults
pub mod client_defaults {
    /// Hub base URL
    pub const BASE_URL: &str = "http://127.0.0.1:8080";
    /// Decoded events buffered for the caller before new ones are dropped
    pub const EVENT_QUEUE_CAPACITY: usize = 100;
    /// First reconnect delay in milliseconds
    pub const RECONNECT_INITIAL_MS: u64 = 250;
    /// Reconnect delay ceiling in milliseconds
    pub const RECONNECT_MAX_MS: u64 = 10_000;
    /// Timeout for one request/response call, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Route paths
pub mod routes {
    /// Subscription stream
    pub const EVENTS: &str = "/api/events";
    /// `listPrompts`
    pub const PROMPTS: &str = "/api/prompts";
    /// `getPrompt`
    pub const PROMPTS_GET: &str = "/api/prompts/get";
    /// `listTools`
    pub const TOOLS: &str = "/api/tools";
    /// `callTool`
    pub const TOOLS_CALL: &str = "/api/tools/call";
    /// `listResources`
    pub const RESOURCES: &str = "/api/resources";
    /// `readResource`
    pub const RESOURCES_READ: &str = "/api/resources/read";
    /// Liveness and hub statistics
    pub const HEALTH: &str = "/health";
}
