// ABOUTME: Configuration management module for hub server and client settings
// ABOUTME: Re-exports the environment-driven configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module
//!
//! - **Environment**: server and client configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::{BackoffConfig, ClientConfig, ServerConfig, SseConfig};
