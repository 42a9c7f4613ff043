// ABOUTME: HTTP middleware applied by the router
// ABOUTME: CORS policy for the request/response endpoints and per-request tracing spans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Cross-origin policy
pub mod cors;

/// Request spans with correlation IDs
pub mod tracing;

pub use cors::setup_cors;
pub use self::tracing::{request_tracing, RequestSpan};
