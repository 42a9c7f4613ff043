// ABOUTME: In-memory service implementation backed by registered prompts, tools and resources
// ABOUTME: Renders prompt templates, dispatches tool handlers and serves resource bytes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! In-memory catalog
//!
//! Prompts are templates with `{{argument}}` placeholders. Tools are plain
//! closures from the arguments object to a result. Resources are byte blobs
//! with a declared MIME type. Listing order is by name.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mcp_stream_core::models::{
    CallToolResult, GetPromptResult, Prompt, PromptArgument, Resource, ResourceContents, Tool,
};
use serde_json::{json, Value};

use super::service::{McpService, ServiceError};

/// Handler invoked by `callTool`
pub type ToolHandler = Arc<dyn Fn(Value) -> Result<CallToolResult, ServiceError> + Send + Sync>;

struct PromptEntry {
    prompt: Prompt,
    template: String,
}

struct ToolEntry {
    tool: Tool,
    handler: ToolHandler,
}

struct ResourceEntry {
    resource: Resource,
    data: Vec<u8>,
}

/// Service answering from registered in-memory entries
#[derive(Default)]
pub struct InMemoryCatalog {
    prompts: BTreeMap<String, PromptEntry>,
    tools: BTreeMap<String, ToolEntry>,
    resources: BTreeMap<String, ResourceEntry>,
}

impl fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCatalog")
            .field("prompts", &self.prompts.keys().collect::<Vec<_>>())
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InMemoryCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prompt rendered from `template`
    #[must_use]
    pub fn with_prompt(mut self, prompt: Prompt, template: impl Into<String>) -> Self {
        self.prompts.insert(
            prompt.name.clone(),
            PromptEntry {
                prompt,
                template: template.into(),
            },
        );
        self
    }

    /// Register a tool and its handler
    #[must_use]
    pub fn with_tool<F>(mut self, tool: Tool, handler: F) -> Self
    where
        F: Fn(Value) -> Result<CallToolResult, ServiceError> + Send + Sync + 'static,
    {
        self.tools.insert(
            tool.name.clone(),
            ToolEntry {
                tool,
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Register a resource with its contents
    #[must_use]
    pub fn with_resource(mut self, resource: Resource, data: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(
            resource.name.clone(),
            ResourceEntry {
                resource,
                data: data.into(),
            },
        );
        self
    }

    /// Catalog served by the hub binary
    #[must_use]
    pub fn demo() -> Self {
        Self::new()
            .with_prompt(
                Prompt {
                    name: "greeting".into(),
                    description: Some("A plain greeting".into()),
                    arguments: Vec::new(),
                },
                "Hello",
            )
            .with_prompt(
                Prompt {
                    name: "welcome".into(),
                    description: Some("Welcome a named user".into()),
                    arguments: vec![PromptArgument {
                        name: "name".into(),
                        description: Some("Who to welcome".into()),
                        required: true,
                    }],
                },
                "Welcome, {{name}}!",
            )
            .with_tool(
                Tool {
                    name: "echo".into(),
                    description: Some("Return the arguments unchanged".into()),
                    input_schema: json!({"type": "object"}),
                },
                |arguments| {
                    Ok(CallToolResult {
                        content: arguments,
                        is_error: false,
                    })
                },
            )
            .with_tool(
                Tool {
                    name: "add".into(),
                    description: Some("Add two numbers".into()),
                    input_schema: json!({
                        "type": "object",
                        "properties": {"a": {"type": "number"}, "b": {"type": "number"}},
                        "required": ["a", "b"]
                    }),
                },
                add_numbers,
            )
            .with_resource(
                Resource {
                    name: "readme".into(),
                    mime_type: "text/markdown".into(),
                    description: Some("About this hub".into()),
                },
                "# MCP Stream Hub\n\nEvery call is broadcast to /api/events.\n",
            )
            .with_resource(
                Resource {
                    name: "status".into(),
                    mime_type: "application/json".into(),
                    description: Some("Static status document".into()),
                },
                r#"{"status":"ok"}"#,
            )
            .with_resource(
                Resource {
                    name: "pixel".into(),
                    mime_type: "image/png".into(),
                    description: Some("1x1 transparent PNG".into()),
                },
                PIXEL_PNG.to_vec(),
            )
    }
}

const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

fn add_numbers(arguments: Value) -> Result<CallToolResult, ServiceError> {
    let operand = |key: &str| {
        arguments
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| ServiceError::invalid_params(format!("'{key}' must be a number")))
    };
    let sum = operand("a")? + operand("b")?;
    Ok(CallToolResult {
        content: json!({ "sum": sum }),
        is_error: false,
    })
}

/// Substitute `{{name}}` placeholders, failing on missing required arguments
fn render(
    entry: &PromptEntry,
    arguments: &HashMap<String, String>,
) -> Result<String, ServiceError> {
    if let Some(missing) = entry
        .prompt
        .arguments
        .iter()
        .find(|arg| arg.required && !arguments.contains_key(&arg.name))
    {
        return Err(ServiceError::invalid_params(format!(
            "missing required argument '{}' for prompt '{}'",
            missing.name, entry.prompt.name
        )));
    }

    Ok(arguments
        .iter()
        .fold(entry.template.clone(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
        }))
}

#[async_trait]
impl McpService for InMemoryCatalog {
    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError> {
        Ok(self.prompts.values().map(|e| e.prompt.clone()).collect())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ServiceError> {
        let entry = self
            .prompts
            .get(name)
            .ok_or_else(|| ServiceError::not_found(format!("no such prompt: {name}")))?;
        Ok(GetPromptResult {
            description: entry.prompt.description.clone(),
            content: render(entry, arguments)?,
        })
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, ServiceError> {
        Ok(self.tools.values().map(|e| e.tool.clone()).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ServiceError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ServiceError::not_found("no such tool"))?;
        (entry.handler)(arguments)
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, ServiceError> {
        Ok(self.resources.values().map(|e| e.resource.clone()).collect())
    }

    async fn read_resource(&self, name: &str) -> Result<ResourceContents, ServiceError> {
        let entry = self
            .resources
            .get(name)
            .ok_or_else(|| ServiceError::not_found(format!("no such resource: {name}")))?;
        Ok(ResourceContents {
            data: entry.data.clone(),
            mime_type: entry.resource.mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_stream_core::envelope::error_codes;

    #[tokio::test]
    async fn test_greeting_renders_without_arguments() {
        let catalog = InMemoryCatalog::demo();
        let result = catalog.get_prompt("greeting", &HashMap::new()).await.unwrap();
        assert_eq!(result.content, "Hello");
    }

    #[tokio::test]
    async fn test_template_substitution() {
        let catalog = InMemoryCatalog::demo();
        let arguments = HashMap::from([("name".to_owned(), "Ada".to_owned())]);
        let result = catalog.get_prompt("welcome", &arguments).await.unwrap();
        assert_eq!(result.content, "Welcome, Ada!");
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_invalid_params() {
        let catalog = InMemoryCatalog::demo();
        let error = catalog.get_prompt("welcome", &HashMap::new()).await.unwrap_err();
        assert_eq!(error.error_body().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let catalog = InMemoryCatalog::demo();
        let error = catalog.call_tool("missing", Value::Null).await.unwrap_err();
        assert_eq!(error, ServiceError::not_found("no such tool"));
    }

    #[tokio::test]
    async fn test_add_tool() {
        let catalog = InMemoryCatalog::demo();
        let result = catalog
            .call_tool("add", json!({"a": 2, "b": 3.5}))
            .await
            .unwrap();
        assert_eq!(result.content, json!({"sum": 5.5}));

        let error = catalog.call_tool("add", json!({"a": 2})).await.unwrap_err();
        assert_eq!(error.error_body().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_listings_are_sorted_by_name() {
        let catalog = InMemoryCatalog::demo();
        let names: Vec<_> = catalog
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["add", "echo"]);
    }
}
