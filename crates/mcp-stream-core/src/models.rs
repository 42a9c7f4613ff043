// ABOUTME: Prompt, tool and resource data transfer objects shared by server and client
// ABOUTME: Mirrors the JSON shapes exchanged on the request/response endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A prompt template advertised by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Unique prompt name
    pub name: String,
    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments accepted by the template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

/// One argument of a prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptArgument {
    /// Argument name as used in the template
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether `getPrompt` fails without it
    #[serde(default)]
    pub required: bool,
}

/// Body of `POST /api/prompts/get`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPromptRequest {
    /// Prompt name
    pub name: String,
    /// Template arguments
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

/// A rendered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPromptResult {
    /// Description of the rendered prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rendered text
    pub content: String,
}

/// A tool advertised by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Unique tool name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments object
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({"type": "object"})
}

/// Body of `POST /api/tools/call`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolRequest {
    /// Tool name
    pub name: String,
    /// Arguments object (null when omitted)
    #[serde(default)]
    pub arguments: Value,
}

/// Output of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Tool output
    pub content: Value,
    /// Set when the tool ran but reported a domain-level failure
    #[serde(default)]
    pub is_error: bool,
}

/// A resource advertised by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Unique resource name
    pub name: String,
    /// Declared MIME type of the contents
    pub mime_type: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /api/resources/read`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceRequest {
    /// Resource name
    pub name: String,
}

/// Structured form of non-text resource contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBlob {
    /// Resource name
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) contents
    pub blob: String,
}

impl ResourceBlob {
    /// Encode raw contents
    #[must_use]
    pub fn encode(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            blob: STANDARD.encode(bytes),
        }
    }

    /// Decode the base64 contents
    ///
    /// # Errors
    ///
    /// Returns an error if `blob` is not valid base64
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.blob)
    }
}

/// Raw contents of a resource together with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContents {
    /// Raw bytes
    pub data: Vec<u8>,
    /// MIME type
    pub mime_type: String,
}

impl ResourceContents {
    /// Contents as UTF-8 text, if valid
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Whether a MIME type is served as a raw body rather than a structured result
#[must_use]
pub fn is_text_mime(mime_type: &str) -> bool {
    mime_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| {
            essence.len() > 5
                && essence
                    .get(..5)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text/"))
        })
}
