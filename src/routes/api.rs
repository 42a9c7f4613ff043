// ABOUTME: Request/response endpoints for prompts, tools and resources
// ABOUTME: Thin handlers that decode the body, call the gateway and wrap the outcome in an envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Request/response API
//!
//! Every endpoint answers with an envelope, except `readResource` for text
//! MIME types, which answers with the raw contents and their `Content-Type`.
//! Malformed request bodies are rejected with `invalid_request` before
//! reaching the gateway, so they are not broadcast.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mcp_stream_core::models::{
    is_text_mime, CallToolRequest, CallToolResult, GetPromptRequest, GetPromptResult, Prompt,
    ReadResourceRequest, Resource, ResourceBlob, Tool,
};
use mcp_stream_core::Envelope;

use crate::constants::routes;
use crate::mcp::{ServiceError, ServiceGateway};

type ApiResult<T> = Result<Envelope<T>, ServiceError>;

/// Prompt, tool and resource routes
pub struct ApiRoutes;

impl ApiRoutes {
    /// Create all request/response routes
    pub fn routes(gateway: ServiceGateway) -> Router {
        Router::new()
            .route(routes::PROMPTS, get(Self::list_prompts))
            .route(routes::PROMPTS_GET, post(Self::get_prompt))
            .route(routes::TOOLS, get(Self::list_tools))
            .route(routes::TOOLS_CALL, post(Self::call_tool))
            .route(routes::RESOURCES, get(Self::list_resources))
            .route(routes::RESOURCES_READ, post(Self::read_resource))
            .with_state(gateway)
    }

    async fn list_prompts(State(gateway): State<ServiceGateway>) -> ApiResult<Vec<Prompt>> {
        gateway.list_prompts().await.map(Envelope::ok)
    }

    async fn get_prompt(
        State(gateway): State<ServiceGateway>,
        body: Result<Json<GetPromptRequest>, JsonRejection>,
    ) -> ApiResult<GetPromptResult> {
        let Json(request) = body?;
        gateway
            .get_prompt(&request.name, &request.arguments)
            .await
            .map(Envelope::ok)
    }

    async fn list_tools(State(gateway): State<ServiceGateway>) -> ApiResult<Vec<Tool>> {
        gateway.list_tools().await.map(Envelope::ok)
    }

    async fn call_tool(
        State(gateway): State<ServiceGateway>,
        body: Result<Json<CallToolRequest>, JsonRejection>,
    ) -> ApiResult<CallToolResult> {
        let Json(request) = body?;
        gateway
            .call_tool(&request.name, request.arguments)
            .await
            .map(Envelope::ok)
    }

    async fn list_resources(State(gateway): State<ServiceGateway>) -> ApiResult<Vec<Resource>> {
        gateway.list_resources().await.map(Envelope::ok)
    }

    async fn read_resource(
        State(gateway): State<ServiceGateway>,
        body: Result<Json<ReadResourceRequest>, JsonRejection>,
    ) -> Result<Response, ServiceError> {
        let Json(request) = body?;
        let contents = gateway.read_resource(&request.name).await?;

        if is_text_mime(&contents.mime_type) {
            return Ok(([(CONTENT_TYPE, contents.mime_type)], contents.data).into_response());
        }

        let blob = ResourceBlob::encode(request.name, &contents.mime_type, &contents.data);
        Ok(Envelope::ok(blob).into_response())
    }
}
