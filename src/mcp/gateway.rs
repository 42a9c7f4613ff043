// ABOUTME: Gateway running service calls and republishing every outcome to the broadcast hub
// ABOUTME: Successes are broadcast under their event tag, failures as error events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use mcp_stream_core::event_types;
use mcp_stream_core::models::{
    is_text_mime, CallToolResult, GetPromptResult, Prompt, Resource, ResourceBlob,
    ResourceContents, Tool,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::service::{McpService, ServiceError};
use crate::sse::BroadcastHub;

/// Service wrapper that republishes call outcomes to subscribers
#[derive(Clone)]
pub struct ServiceGateway {
    service: Arc<dyn McpService>,
    hub: Arc<BroadcastHub>,
}

impl ServiceGateway {
    /// Gateway over `service` publishing to `hub`
    #[must_use]
    pub fn new(service: Arc<dyn McpService>, hub: Arc<BroadcastHub>) -> Self {
        Self { service, hub }
    }

    /// Hub receiving the republished outcomes
    #[must_use]
    pub const fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// `listPrompts`
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError> {
        let started = Instant::now();
        let result = self.service.list_prompts().await;
        self.publish("listPrompts", event_types::PROMPTS, started, result)
    }

    /// `getPrompt`
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ServiceError> {
        let started = Instant::now();
        let result = self.service.get_prompt(name, arguments).await;
        self.publish("getPrompt", event_types::PROMPT, started, result)
    }

    /// `listTools`
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ServiceError> {
        let started = Instant::now();
        let result = self.service.list_tools().await;
        self.publish("listTools", event_types::TOOLS, started, result)
    }

    /// `callTool`
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ServiceError> {
        let started = Instant::now();
        let result = self.service.call_tool(name, arguments).await;
        self.publish("callTool", event_types::TOOL_RESULT, started, result)
    }

    /// `listResources`
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn list_resources(&self) -> Result<Vec<Resource>, ServiceError> {
        let started = Instant::now();
        let result = self.service.list_resources().await;
        self.publish("listResources", event_types::RESOURCES, started, result)
    }

    /// `readResource`
    ///
    /// Subscribers receive `{name, mimeType, text}` for text MIME types and
    /// the base64 [`ResourceBlob`] form otherwise.
    ///
    /// # Errors
    ///
    /// Returns the service failure after broadcasting it
    pub async fn read_resource(&self, name: &str) -> Result<ResourceContents, ServiceError> {
        let started = Instant::now();
        let result = self.service.read_resource(name).await;
        match &result {
            Ok(contents) => self.report_success(
                "readResource",
                event_types::RESOURCE,
                started,
                &resource_event(name, contents),
            ),
            Err(error) => self.report_failure("readResource", started, error),
        }
        result
    }

    fn publish<T: Serialize>(
        &self,
        operation: &'static str,
        event_type: &str,
        started: Instant,
        result: Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        match &result {
            Ok(value) => self.report_success(operation, event_type, started, value),
            Err(error) => self.report_failure(operation, started, error),
        }
        result
    }

    fn report_success(
        &self,
        operation: &'static str,
        event_type: &str,
        started: Instant,
        payload: &impl Serialize,
    ) {
        let elapsed_ms = started.elapsed().as_millis();
        let delivered = self.hub.broadcast(event_type, payload);
        debug!(mcp.operation = operation, elapsed_ms, delivered, "Call succeeded");
    }

    fn report_failure(&self, operation: &'static str, started: Instant, error: &ServiceError) {
        let elapsed_ms = started.elapsed().as_millis();
        let body = error.error_body();
        let delivered = self.hub.broadcast_error(&body);
        warn!(
            mcp.operation = operation,
            elapsed_ms,
            delivered,
            error.code = %body.code,
            error.message = %body.message,
            "Call failed"
        );
    }
}

/// Broadcast form of resource contents
fn resource_event(name: &str, contents: &ResourceContents) -> Value {
    match contents.as_text() {
        Some(text) if is_text_mime(&contents.mime_type) => json!({
            "name": name,
            "mimeType": contents.mime_type,
            "text": text,
        }),
        _ => json!(ResourceBlob::encode(name, &contents.mime_type, &contents.data)),
    }
}
