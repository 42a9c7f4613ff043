// ABOUTME: Reconnecting hub client combining request/response calls with one event subscription
// ABOUTME: Decoded events are buffered in a bounded queue that drops new events when full
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # MCP stream client
//!
//! ```rust,no_run
//! use mcp_stream_hub::client::McpStreamClient;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = McpStreamClient::from_url("http://127.0.0.1:8080")?;
//! client.connect(CancellationToken::new())?;
//!
//! let tools = client.list_tools().await?;
//! println!("{} tools", tools.len());
//!
//! if let Some(event) = client.next_event().await {
//!     println!("{event:?}");
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

/// Client error taxonomy
pub mod error;

/// Background subscription loop and reconnect backoff
pub mod subscription;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mcp_stream_core::models::{
    is_text_mime, CallToolRequest, CallToolResult, GetPromptRequest, GetPromptResult, Prompt,
    ReadResourceRequest, Resource, ResourceBlob, ResourceContents, Tool,
};
use mcp_stream_core::Envelope;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

pub use error::{ClientError, ClientResult};
pub use subscription::{Backoff, SubscriptionStats};

use crate::config::ClientConfig;
use crate::constants::routes;
use subscription::{SessionEvent, SubscriptionLoop};

struct ActiveSubscription {
    closed: CancellationToken,
    task: JoinHandle<()>,
}

/// Client for one hub
pub struct McpStreamClient {
    config: ClientConfig,
    http: reqwest::Client,
    stream_http: reqwest::Client,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: tokio::sync::Mutex<mpsc::Receiver<SessionEvent>>,
    session: Arc<AtomicU64>,
    subscription: Mutex<Option<ActiveSubscription>>,
    stats: Arc<SubscriptionStats>,
}

impl McpStreamClient {
    /// Client for the hub described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::InternalError(format!("Failed to build HTTP client: {e}")))?;
        // No overall timeout: the event stream stays open indefinitely
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::InternalError(format!("Failed to build HTTP client: {e}")))?;

        let (events_tx, events_rx) = mpsc::channel(config.event_queue_capacity.max(1));

        Ok(Self {
            config,
            http,
            stream_http,
            events_tx,
            events_rx: tokio::sync::Mutex::new(events_rx),
            session: Arc::new(AtomicU64::new(0)),
            subscription: Mutex::new(None),
            stats: Arc::new(SubscriptionStats::default()),
        })
    }

    /// Client with default settings for `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL
    pub fn from_url(base_url: &str) -> ClientResult<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| ClientError::InternalError(format!("Invalid base URL {base_url}: {e}")))?;
        Self::new(ClientConfig::new(url))
    }

    /// Hub base URL
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let mut base = self.config.base_url.clone();
        if !base.path().ends_with('/') {
            let path_with_slash = format!("{}/", base.path());
            base.set_path(&path_with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InternalError(format!("Invalid endpoint {path}: {e}")))
    }

    /// Start the background subscription
    ///
    /// The loop runs until `cancel` fires or [`Self::close`] is called,
    /// reconnecting with backoff whenever the stream ends or fails. Events
    /// still queued from an earlier session are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyConnected`] while a previous loop is still running
    pub fn connect(&self, cancel: CancellationToken) -> ClientResult<()> {
        let url = self.endpoint(routes::EVENTS)?;
        let mut slot = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.as_ref().is_some_and(|active| !active.task.is_finished()) {
            return Err(ClientError::AlreadyConnected);
        }

        let session = self.start_session();
        let closed = CancellationToken::new();
        let subscription = SubscriptionLoop {
            http: self.stream_http.clone(),
            url,
            events: self.events_tx.clone(),
            session,
            current_session: Arc::clone(&self.session),
            backoff: Backoff::new(self.config.backoff),
            cancel,
            closed: closed.clone(),
            stats: Arc::clone(&self.stats),
        };
        let task = tokio::spawn(subscription.run());
        *slot = Some(ActiveSubscription { closed, task });
        drop(slot);

        info!(base_url = %self.config.base_url, session, "Subscription started");
        Ok(())
    }

    /// Stop the background subscription; calling it again does nothing
    pub fn close(&self) {
        let active = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(active) = active {
            active.closed.cancel();
            self.start_session();
            debug!("Subscription close requested");
        }
    }

    /// Supersede the running session and discard its queued events
    fn start_session(&self) -> u64 {
        let session = self.session.fetch_add(1, Ordering::AcqRel) + 1;
        self.stats.mark_disconnected();
        // A reader parked in `next_event` filters stale entries itself
        if let Ok(mut events) = self.events_rx.try_lock() {
            while events.try_recv().is_ok() {}
        }
        session
    }

    fn is_current(&self, session: u64) -> bool {
        self.session.load(Ordering::Acquire) == session
    }

    /// Whether a subscription loop is running
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Subscription counters
    #[must_use]
    pub fn stats(&self) -> &SubscriptionStats {
        &self.stats
    }

    /// Wait for the next received event envelope
    ///
    /// Waits indefinitely while no event arrives; wrap in a timeout if needed.
    pub async fn next_event(&self) -> Option<Envelope> {
        let mut events = self.events_rx.lock().await;
        loop {
            let (session, envelope) = events.recv().await?;
            if self.is_current(session) {
                return Some(envelope);
            }
        }
    }

    /// Received event envelope if one is queued
    pub fn try_next_event(&self) -> Option<Envelope> {
        let mut events = self.events_rx.try_lock().ok()?;
        loop {
            let (session, envelope) = events.try_recv().ok()?;
            if self.is_current(session) {
                return Some(envelope);
            }
        }
    }

    /// `listPrompts`
    ///
    /// # Errors
    ///
    /// Returns an error if the hub is unreachable, reports a failure or answers with an unexpected shape
    pub async fn list_prompts(&self) -> ClientResult<Vec<Prompt>> {
        self.get(routes::PROMPTS).await
    }

    /// `getPrompt`
    ///
    /// # Errors
    ///
    /// Returns an error if the hub is unreachable, reports a failure or answers with an unexpected shape
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> ClientResult<GetPromptResult> {
        let request = GetPromptRequest {
            name: name.to_owned(),
            arguments,
        };
        self.post(routes::PROMPTS_GET, &request).await
    }

    /// `listTools`
    ///
    /// # Errors
    ///
    /// Returns an error if the hub is unreachable, reports a failure or answers with an unexpected shape
    pub async fn list_tools(&self) -> ClientResult<Vec<Tool>> {
        self.get(routes::TOOLS).await
    }

    /// `callTool`
    ///
    /// # Errors
    ///
    /// Returns an error if the hub is unreachable, reports a failure or answers with an unexpected shape
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ClientResult<CallToolResult> {
        let request = CallToolRequest {
            name: name.to_owned(),
            arguments,
        };
        self.post(routes::TOOLS_CALL, &request).await
    }

    /// `listResources`
    ///
    /// # Errors
    ///
    /// Returns an error if the hub is unreachable, reports a failure or answers with an unexpected shape
    pub async fn list_resources(&self) -> ClientResult<Vec<Resource>> {
        self.get(routes::RESOURCES).await
    }

    /// `readResource`
    ///
    /// A text `Content-Type` is taken as the raw contents. Anything else must
    /// be an envelope holding `{name, mimeType, blob}` with base64 contents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedResult`] if the structured form is missing
    /// fields or carries invalid base64, and the usual call errors otherwise
    pub async fn read_resource(&self, name: &str) -> ClientResult<ResourceContents> {
        let request = ReadResourceRequest {
            name: name.to_owned(),
        };
        let response = self
            .http
            .post(self.endpoint(routes::RESOURCES_READ)?)
            .json(&request)
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        if response.status().is_success() && is_text_mime(&content_type) {
            let data = response.bytes().await?;
            return Ok(ResourceContents {
                data: data.to_vec(),
                mime_type: content_type,
            });
        }

        let blob: ResourceBlob = Self::decode_envelope(response).await?;
        let data = blob
            .decode()
            .map_err(|e| ClientError::MalformedResult(format!("invalid base64 blob: {e}")))?;
        Ok(ResourceContents {
            data,
            mime_type: blob.mime_type,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.http.get(self.endpoint(path)?).send().await?;
        Self::decode_envelope(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode_envelope(response).await
    }

    async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        match Envelope::<T>::decode_slice(&body) {
            Ok(envelope) => Ok(envelope.into_result()?),
            Err(e) if status.is_success() => Err(ClientError::MalformedResult(e.to_string())),
            Err(_) => Err(ClientError::InternalError(format!(
                "hub answered HTTP {status} without an envelope"
            ))),
        }
    }
}

impl Drop for McpStreamClient {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for McpStreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpStreamClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("subscribed", &self.is_subscribed())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
