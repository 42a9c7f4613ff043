// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
// ABOUTME: Output formatting helpers for mcp-stream-client
// ABOUTME: Provides consistent display functions for listings, events and resource contents

use anyhow::Result;
use mcp_stream_core::models::{Prompt, Resource, ResourceContents, Tool};
use mcp_stream_core::StreamEvent;
use serde::Serialize;

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_prompts(prompts: &[Prompt]) {
    println!("{} prompt(s)", prompts.len());
    for prompt in prompts {
        let arguments: Vec<String> = prompt
            .arguments
            .iter()
            .map(|arg| {
                if arg.required {
                    arg.name.clone()
                } else {
                    format!("[{}]", arg.name)
                }
            })
            .collect();
        println!(
            "  {:<20} {:<30} {}",
            prompt.name,
            arguments.join(" "),
            prompt.description.as_deref().unwrap_or_default()
        );
    }
}

pub fn print_tools(tools: &[Tool]) {
    println!("{} tool(s)", tools.len());
    for tool in tools {
        println!(
            "  {:<20} {}",
            tool.name,
            tool.description.as_deref().unwrap_or_default()
        );
    }
}

pub fn print_resources(resources: &[Resource]) {
    println!("{} resource(s)", resources.len());
    for resource in resources {
        println!(
            "  {:<20} {:<24} {}",
            resource.name,
            resource.mime_type,
            resource.description.as_deref().unwrap_or_default()
        );
    }
}

pub fn print_resource_contents(contents: &ResourceContents) {
    match contents.as_text() {
        Some(text) if !contents.mime_type.starts_with("image/") => println!("{text}"),
        _ => println!(
            "<{} bytes of {}>",
            contents.data.len(),
            contents.mime_type
        ),
    }
}

pub fn print_event(event: &StreamEvent) -> Result<()> {
    match event {
        StreamEvent::Update(payload) => {
            println!("[{}]", payload.event_type);
            print_json(&payload.data)
        }
        StreamEvent::Failure(error) => {
            println!("[error] {error}");
            Ok(())
        }
    }
}
