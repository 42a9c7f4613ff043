// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
// ABOUTME: Request/response subcommands for mcp-stream-client
// ABOUTME: Lists and invokes prompts, tools and resources and prints the results

use std::collections::HashMap;

use anyhow::{Context, Result};
use mcp_stream_hub::client::McpStreamClient;
use serde_json::Value;

use crate::helpers::display;

/// Parse a `key=value` template argument
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

pub async fn list_prompts(client: &McpStreamClient) -> Result<()> {
    let prompts = client.list_prompts().await?;
    display::print_prompts(&prompts);
    Ok(())
}

pub async fn get_prompt(
    client: &McpStreamClient,
    name: &str,
    arguments: Vec<(String, String)>,
) -> Result<()> {
    let arguments: HashMap<String, String> = arguments.into_iter().collect();
    let result = client.get_prompt(name, arguments).await?;
    println!("{}", result.content);
    Ok(())
}

pub async fn list_tools(client: &McpStreamClient) -> Result<()> {
    let tools = client.list_tools().await?;
    display::print_tools(&tools);
    Ok(())
}

pub async fn call_tool(client: &McpStreamClient, name: &str, args: Option<&str>) -> Result<()> {
    let arguments = args
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--args must be valid JSON")?
        .unwrap_or(Value::Null);
    let result = client.call_tool(name, arguments).await?;
    display::print_json(&result.content)?;
    if result.is_error {
        anyhow::bail!("tool '{name}' reported an error");
    }
    Ok(())
}

pub async fn list_resources(client: &McpStreamClient) -> Result<()> {
    let resources = client.list_resources().await?;
    display::print_resources(&resources);
    Ok(())
}

pub async fn read_resource(client: &McpStreamClient, name: &str) -> Result<()> {
    let contents = client.read_resource(name).await?;
    display::print_resource_contents(&contents);
    Ok(())
}
