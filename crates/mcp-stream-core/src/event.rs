// ABOUTME: Broadcast event payloads and their type tags
// ABOUTME: Events travel inside an Envelope whose result carries {type, data}
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Envelope, EnvelopeError, ErrorBody};

/// Type tags used for events republished from service calls
pub mod event_types {
    /// Result of `listPrompts`
    pub const PROMPTS: &str = "prompts";
    /// Result of `getPrompt`
    pub const PROMPT: &str = "prompt";
    /// Result of `listTools`
    pub const TOOLS: &str = "tools";
    /// Result of `callTool`
    pub const TOOL_RESULT: &str = "tool_result";
    /// Result of `listResources`
    pub const RESOURCES: &str = "resources";
    /// Result of `readResource`
    pub const RESOURCE: &str = "resource";
    /// Pseudo-tag reported for error events, which carry no `type` on the wire
    pub const ERROR: &str = "error";
}

/// The `result` of an event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload<T = Value> {
    /// Event type tag
    #[serde(rename = "type")]
    pub event_type: String,
    /// Arbitrary payload
    pub data: T,
}

impl<T> EventPayload<T> {
    /// Create a payload under the given tag
    pub fn new(event_type: impl Into<String>, data: T) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

impl EventPayload {
    /// Build the envelope for an event, converting `data` to JSON first
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be represented as JSON
    pub fn envelope(
        event_type: impl Into<String>,
        data: &impl Serialize,
    ) -> Result<Envelope<Self>, EnvelopeError> {
        let data = serde_json::to_value(data)?;
        Ok(Envelope::ok(Self::new(event_type, data)))
    }
}

/// A received event after envelope interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A state change published by a successful call
    Update(EventPayload),
    /// A failure published by an unsuccessful call
    Failure(ErrorBody),
}

impl StreamEvent {
    /// Interpret a raw event envelope
    ///
    /// # Errors
    ///
    /// Returns an error if a successful envelope does not carry `{type, data}`
    /// or a failed one carries no error body.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, EnvelopeError> {
        match envelope.into_result() {
            Ok(result) => Ok(Self::Update(serde_json::from_value(result)?)),
            Err(EnvelopeError::Remote(body)) => Ok(Self::Failure(body)),
            Err(e) => Err(e),
        }
    }

    /// Type tag of this event (`error` for failures)
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Update(payload) => &payload.event_type,
            Self::Failure(_) => event_types::ERROR,
        }
    }
}
