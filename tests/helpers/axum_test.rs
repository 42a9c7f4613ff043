// ABOUTME: Axum HTTP testing utilities for integration tests
// ABOUTME: Provides helpers to test Axum routes and read SSE frames without running a full server

use std::collections::VecDeque;
use std::time::Duration;

use axum::{
    body::{Body, BodyDataStream},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use futures_util::StreamExt;
use mcp_stream_core::{Envelope, SseFrame, SseLineBuffer};
use serde::Serialize;
use tower::ServiceExt;

/// How long a single SSE read may wait before the test fails
const FRAME_WAIT: Duration = Duration::from_secs(5);

/// Helper to build and execute HTTP requests against Axum routers
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl AxumTestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET `uri`
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// POST to `uri`
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Serialize `data` as the JSON body
    pub fn json<T: Serialize>(self, data: &T) -> Self {
        let body = serde_json::to_string(data).expect("Failed to serialize JSON");
        self.raw_json(&body)
    }

    /// Send `body` verbatim with a JSON content type
    pub fn raw_json(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);

        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }

        let body = self.body.unwrap_or_default();
        builder
            .body(Body::from(body))
            .expect("Failed to build request")
    }

    /// Execute the request against an Axum router
    pub async fn send(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        AxumTestResponse::from_response(response).await
    }

    /// Execute request for SSE endpoints, keeping the body open for frame reads
    ///
    /// SSE endpoints return long-lived streams, so the body is never read to
    /// completion here. The subscriber is registered by the time this returns.
    #[allow(dead_code)]
    pub async fn send_sse(self, app: Router) -> SseTestStream {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        SseTestStream::from_response(response)
    }
}

/// Wrapper around Axum HTTP response for testing
pub struct AxumTestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    /// Create from response by eagerly reading the body
    async fn from_response(response: axum::http::Response<Body>) -> Self {
        use axum::body::to_bytes;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a response header as a string
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the response body as a JSON value
    pub fn json<T: serde::de::DeserializeOwned>(self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }

    /// Get the response body as a string
    #[allow(dead_code)]
    pub fn text(self) -> String {
        String::from_utf8(self.body).expect("Failed to decode response as UTF-8")
    }

    /// Assert that the status code matches
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}",
            expected, self.status
        );
        self
    }
}

/// Open SSE response read frame by frame
pub struct SseTestStream {
    status: StatusCode,
    headers: HeaderMap,
    body: BodyDataStream,
    parser: SseLineBuffer,
    pending: VecDeque<SseFrame>,
}

impl SseTestStream {
    fn from_response(response: axum::http::Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        Self {
            status,
            headers,
            body: response.into_body().into_data_stream(),
            parser: SseLineBuffer::new(),
            pending: VecDeque::new(),
        }
    }

    /// Response status code
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Get a response header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Next frame, or `None` once the stream has ended
    ///
    /// Panics if nothing arrives within five seconds.
    pub async fn next_frame(&mut self) -> Option<SseFrame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }

            let chunk = tokio::time::timeout(FRAME_WAIT, self.body.next())
                .await
                .expect("Timed out waiting for an SSE frame");

            match chunk {
                Some(Ok(bytes)) => self.pending.extend(self.parser.feed(&bytes)),
                Some(Err(e)) => panic!("SSE body failed: {e}"),
                None => {
                    self.pending.extend(self.parser.finish());
                    return self.pending.pop_front();
                }
            }
        }
    }

    /// Next `data:` frame decoded as an envelope, skipping comments
    pub async fn next_envelope(&mut self) -> Option<Envelope> {
        while let Some(frame) = self.next_frame().await {
            if let SseFrame::Data(data) = frame {
                return Some(Envelope::decode(&data).expect("Event is not an envelope"));
            }
        }
        None
    }
}
