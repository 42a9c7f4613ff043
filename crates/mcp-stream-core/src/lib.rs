// ABOUTME: Core wire types for the MCP stream hub
// ABOUTME: Foundation crate with envelope codec, SSE framing, event tags and shared models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # MCP Stream Core
//!
//! Shared by the server-side broadcast hub and the reconnecting client. This
//! crate changes rarely and carries no runtime, so both sides agree on the
//! wire format by construction.
//!
//! ## Modules
//!
//! - **envelope**: the `{success, result, error}` request/response wrapper
//! - **event**: broadcast event payloads and their type tags
//! - **frame**: SSE line framing (encoder and incremental line parser)
//! - **models**: prompt, tool and resource DTOs exchanged over the API

/// Request/response envelope codec
pub mod envelope;

/// Broadcast event payloads and type tags
pub mod event;

/// SSE frame encoding and line-buffered parsing
pub mod frame;

/// Prompt, tool and resource data transfer objects
pub mod models;

pub use envelope::{Envelope, EnvelopeError, ErrorBody};
pub use event::{event_types, EventPayload, StreamEvent};
pub use frame::{SseFrame, SseLineBuffer};
