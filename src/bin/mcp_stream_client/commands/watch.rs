// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
// ABOUTME: Event watching subcommand for mcp-stream-client
// ABOUTME: Keeps a subscription open and prints each broadcast event until interrupted

use anyhow::Result;
use mcp_stream_core::StreamEvent;
use mcp_stream_hub::client::McpStreamClient;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::helpers::display;

pub async fn run(client: &McpStreamClient, count: Option<usize>) -> Result<()> {
    let cancel = CancellationToken::new();
    client.connect(cancel.clone())?;
    info!(base_url = %client.base_url(), "Watching events; press ctrl-c to stop");

    let mut seen = 0_usize;
    while count.is_none_or(|limit| seen < limit) {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            event = client.next_event() => {
                let Some(envelope) = event else { break };
                match StreamEvent::from_envelope(envelope) {
                    Ok(event) => display::print_event(&event)?,
                    Err(e) => warn!(error = %e, "Skipping malformed event"),
                }
                seen += 1;
            }
        }
    }

    cancel.cancel();
    client.close();
    info!(
        events = seen,
        dropped = client.stats().dropped_events(),
        "Stopped watching"
    );
    Ok(())
}
