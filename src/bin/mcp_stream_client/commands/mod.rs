// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
// ABOUTME: Re-exports command modules for mcp-stream-client
// ABOUTME: Provides the request/response calls and the event watcher

pub mod calls;
pub mod watch;
