// ABOUTME: Command-line client for the MCP stream hub
// ABOUTME: Issues request/response calls and watches the broadcast event stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # Print every broadcast event until interrupted
//! mcp-stream-client watch
//!
//! # Stop after five events
//! mcp-stream-client watch --count 5
//!
//! # Render a prompt with arguments
//! mcp-stream-client prompt welcome --arg name=Ada
//!
//! # Call a tool with a JSON arguments object
//! mcp-stream-client call add --args '{"a": 1, "b": 2}'
//!
//! # Read a resource
//! mcp-stream-client read readme
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcp_stream_hub::{
    client::McpStreamClient, config::ClientConfig, constants::service_names,
    logging::LoggingConfig,
};
use tracing::debug;
use url::Url;

#[derive(Parser)]
#[command(
    name = "mcp-stream-client",
    about = "MCP Stream Hub client",
    long_about = "Calls the prompt, tool and resource API of an MCP stream hub and watches its broadcast events."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Hub base URL override
    #[arg(long, global = true)]
    url: Option<Url>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Subscribe and print broadcast events
    Watch {
        /// Exit after this many events
        #[arg(long)]
        count: Option<usize>,
    },

    /// List prompts
    Prompts,

    /// Render a prompt
    Prompt {
        /// Prompt name
        name: String,

        /// Template argument as key=value (repeatable)
        #[arg(long = "arg", value_parser = commands::calls::parse_key_value)]
        arguments: Vec<(String, String)>,
    },

    /// List tools
    Tools,

    /// Call a tool
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },

    /// List resources
    Resources,

    /// Read a resource
    Read {
        /// Resource name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env(service_names::MCP_STREAM_CLIENT);
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    debug!(base_url = %config.base_url, "Client configured");

    let client = McpStreamClient::new(config)?;

    match cli.command {
        Command::Watch { count } => commands::watch::run(&client, count).await?,
        Command::Prompts => commands::calls::list_prompts(&client).await?,
        Command::Prompt { name, arguments } => {
            commands::calls::get_prompt(&client, &name, arguments).await?;
        }
        Command::Tools => commands::calls::list_tools(&client).await?,
        Command::Call { name, args } => {
            commands::calls::call_tool(&client, &name, args.as_deref()).await?;
        }
        Command::Resources => commands::calls::list_resources(&client).await?,
        Command::Read { name } => commands::calls::read_resource(&client, &name).await?,
    }

    Ok(())
}
