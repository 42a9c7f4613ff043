// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
// ABOUTME: Re-exports helper modules for mcp-stream-client
// ABOUTME: Provides output formatting utilities

pub mod display;
