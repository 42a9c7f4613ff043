// ABOUTME: MCP service layer: operation trait, in-memory catalog and broadcasting gateway
// ABOUTME: The gateway is the only path from HTTP handlers to the injected service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// In-memory service implementation
pub mod catalog;

/// Call wrapper republishing outcomes to the hub
pub mod gateway;

/// Service trait and error type
pub mod service;

pub use catalog::{InMemoryCatalog, ToolHandler};
pub use gateway::ServiceGateway;
pub use service::{McpService, ServiceError};
