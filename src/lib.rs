// ABOUTME: Main library entry point for the MCP stream hub
// ABOUTME: Broadcast hub, SSE subscription endpoint, request/response API and reconnecting client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # MCP Stream Hub
//!
//! Fans out the results of MCP-style operations (prompts, tools, resources)
//! to every connected Server-Sent Events subscriber, and provides a client
//! that keeps one subscription alive across disconnects while issuing
//! ordinary request/response calls.
//!
//! ## Architecture
//!
//! - **SSE**: the broadcast hub and the per-subscriber stream handler
//! - **MCP**: the service trait, an in-memory catalog and the gateway that
//!   republishes every call outcome to the hub
//! - **Routes**: the HTTP surface (API, subscription stream, health)
//! - **Lifecycle**: ordered shutdown of subscribers and the listener
//! - **Client**: request/response calls plus a reconnecting subscription
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mcp_stream_hub::config::ServerConfig;
//! use mcp_stream_hub::errors::AppResult;
//! use mcp_stream_hub::mcp::InMemoryCatalog;
//! use mcp_stream_hub::server::HubServer;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let timeout = config.shutdown_timeout;
//!     let handle = HubServer::new(config, Arc::new(InMemoryCatalog::demo()))
//!         .start()
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown(timeout).await;
//!     Ok(())
//! }
//! ```

/// Reconnecting subscription client and request/response calls
pub mod client;

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// Ordered shutdown of subscribers and the HTTP listener
pub mod lifecycle;

/// Structured logging setup
pub mod logging;

/// Service trait, in-memory catalog and broadcasting gateway
pub mod mcp;

/// `HTTP` middleware (CORS, request tracing)
pub mod middleware;

/// `HTTP` route assembly
pub mod routes;

/// Listener binding and server handle
pub mod server;

/// Broadcast hub and subscription stream handler
pub mod sse;
