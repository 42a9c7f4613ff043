// ABOUTME: Service trait for the six MCP operations and the error type they report
// ABOUTME: Service errors carry wire codes that reach HTTP callers and subscribers verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mcp_stream_core::envelope::error_codes;
use mcp_stream_core::models::{
    CallToolResult, GetPromptResult, Prompt, Resource, ResourceContents, Tool,
};
use mcp_stream_core::{Envelope, ErrorBody};
use serde_json::Value;

/// Failure reported by a service operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The operation failed with a service-chosen code
    #[error("{0}")]
    Remote(ErrorBody),
    /// The service itself broke while handling the call
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Failure with an explicit code
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote(ErrorBody::new(code, message))
    }

    /// Unknown prompt, tool or resource
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::remote(error_codes::NOT_FOUND, message)
    }

    /// Arguments rejected by the service
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::remote(error_codes::INVALID_PARAMS, message)
    }

    /// Request body that could not be parsed
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::remote(error_codes::INVALID_REQUEST, message)
    }

    /// Unexpected failure inside the service
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Body placed in the error envelope
    #[must_use]
    pub fn error_body(&self) -> ErrorBody {
        match self {
            Self::Remote(body) => body.clone(),
            Self::Internal(message) => ErrorBody::new(error_codes::INTERNAL_ERROR, message),
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Remote(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_request(rejection.body_text())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let envelope: Envelope<Value> = Envelope::from_error(self.error_body());
        (self.http_status(), envelope).into_response()
    }
}

/// The operations exposed over the request/response API
///
/// Implementations are injected into the server; every outcome of every
/// call is republished to subscribers by [`super::ServiceGateway`].
#[async_trait]
pub trait McpService: Send + Sync {
    /// List available prompts
    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError>;

    /// Render one prompt with the given arguments
    async fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ServiceError>;

    /// List available tools
    async fn list_tools(&self) -> Result<Vec<Tool>, ServiceError>;

    /// Invoke one tool
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ServiceError>;

    /// List available resources
    async fn list_resources(&self) -> Result<Vec<Resource>, ServiceError>;

    /// Read the contents of one resource
    async fn read_resource(&self, name: &str) -> Result<ResourceContents, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_use_internal_code() {
        let error = ServiceError::internal("database on fire");
        let body = error.error_body();
        assert_eq!(body.code, error_codes::INTERNAL_ERROR);
        assert_eq!(body.message, "database on fire");
        assert_eq!(error.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_remote_errors_keep_service_code() {
        let error = ServiceError::remote("quota_exceeded", "try later");
        assert_eq!(error.error_body(), ErrorBody::new("quota_exceeded", "try later"));
        assert_eq!(error.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "quota_exceeded: try later");
    }
}
