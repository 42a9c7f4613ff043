// ABOUTME: Unified error type for server wiring: configuration, binding and runtime failures
// ABOUTME: Maps error codes to HTTP status and renders failures as error envelopes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Error Handling
//!
//! `AppError` covers failures of the server itself (bad configuration, a port
//! that cannot be bound, a server task that died). Failures reported by the
//! injected service travel as [`crate::mcp::ServiceError`], whose codes are
//! chosen by the service and surfaced verbatim.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mcp_stream_core::envelope::error_codes;
use mcp_stream_core::Envelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard error codes used by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No route matches the request
    #[serde(rename = "ROUTE_NOT_FOUND")]
    RouteNotFound,
    /// Configuration value is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid,
    /// Network listener could not be set up
    #[serde(rename = "BIND_FAILED")]
    BindFailed,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::ConfigInvalid | Self::BindFailed | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Code placed in the error envelope
    #[must_use]
    pub const fn wire_code(self) -> &'static str {
        match self {
            Self::RouteNotFound => error_codes::NOT_FOUND,
            Self::ConfigInvalid | Self::BindFailed | Self::InternalError => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// User-friendly description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::RouteNotFound => "No route matches the request",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::BindFailed => "Failed to bind the network listener",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the server
#[derive(Debug, thiserror::Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source error for chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create an error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Unknown route
    pub fn route_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RouteNotFound, message)
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Listener setup failure
    pub fn bind(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BindFailed, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string()).with_source(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope: Envelope<Value> = Envelope::failure(self.code.wire_code(), self.message);
        (self.code.http_status(), envelope).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_includes_description_and_message() {
        let error = AppError::bind("127.0.0.1:80 in use");
        assert_eq!(
            error.to_string(),
            "Failed to bind the network listener: 127.0.0.1:80 in use"
        );
        assert_eq!(error.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_errors_keep_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let error = AppError::from(io);
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(error.source().is_some());
    }

    #[test]
    fn test_route_not_found_maps_to_404() {
        let error = AppError::route_not_found("/nowhere");
        assert_eq!(error.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(error.code.wire_code(), error_codes::NOT_FOUND);
    }
}
