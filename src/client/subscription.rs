// ABOUTME: Background subscription loop that keeps one event stream open across disconnects
// ABOUTME: Parses SSE lines, decodes envelopes into the event queue and reconnects with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Subscription loop
//!
//! One loop per `connect`. Each pass opens `GET /api/events`, feeds the body
//! through [`SseLineBuffer`] and pushes every decoded envelope onto the
//! client's event queue with `try_send`, so a slow consumer loses new events
//! instead of stalling the socket. When the stream ends or fails the loop
//! sleeps for the next backoff delay and reconnects. Cancelling either the
//! caller's token or the client's close token stops it at the next await.
//!
//! Queued envelopes are tagged with the session number of the `connect` that
//! started the loop; the client discards any tagged with an older session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use mcp_stream_core::frame::{CONNECTED_COMMENT, KEEPALIVE_COMMENT};
use mcp_stream_core::{Envelope, SseFrame, SseLineBuffer};
use reqwest::header::ACCEPT;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::error::{ClientError, ClientResult};
use crate::config::BackoffConfig;

/// Counters shared between the loop and the client
#[derive(Debug, Default)]
pub struct SubscriptionStats {
    connected: AtomicBool,
    connections: AtomicU64,
    received_events: AtomicU64,
    dropped_events: AtomicU64,
}

impl SubscriptionStats {
    /// Whether a stream is currently open
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Streams successfully opened so far
    #[must_use]
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Events decoded and queued
    #[must_use]
    pub fn received_events(&self) -> u64 {
        self.received_events.load(Ordering::Relaxed)
    }

    /// Events lost because the queue was full
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }
}

/// Envelope received during one `connect` session
pub(crate) type SessionEvent = (u64, Envelope);

/// Doubling reconnect delay with a ceiling
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Backoff starting at `config.initial_delay`
    #[must_use]
    pub const fn new(config: BackoffConfig) -> Self {
        Self {
            initial: config.initial_delay,
            max: config.max_delay,
            current: config.initial_delay,
        }
    }

    /// Delay to wait now; doubles the next one up to the ceiling
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Start over from the initial delay
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

enum StreamEnd {
    Stopped,
    Ended,
}

/// State of one background subscription
pub(crate) struct SubscriptionLoop {
    pub(crate) http: reqwest::Client,
    pub(crate) url: Url,
    pub(crate) events: mpsc::Sender<SessionEvent>,
    pub(crate) session: u64,
    pub(crate) current_session: Arc<AtomicU64>,
    pub(crate) backoff: Backoff,
    pub(crate) cancel: CancellationToken,
    pub(crate) closed: CancellationToken,
    pub(crate) stats: Arc<SubscriptionStats>,
}

impl SubscriptionLoop {
    fn stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.closed.is_cancelled()
    }

    async fn stop_requested(&self) {
        tokio::select! {
            () = self.cancel.cancelled() => {}
            () = self.closed.cancelled() => {}
        }
    }

    fn is_current(&self) -> bool {
        self.current_session.load(Ordering::Acquire) == self.session
    }

    fn set_connected(&self, connected: bool) {
        // A superseded loop must not overwrite the state of its successor
        if self.is_current() {
            self.stats.connected.store(connected, Ordering::Release);
        }
    }

    /// Run until cancelled or closed
    pub(crate) async fn run(mut self) {
        info!(url = %self.url, "Subscription loop started");

        while !self.stopped() {
            match self.connect_and_read().await {
                Ok(StreamEnd::Stopped) => break,
                Ok(StreamEnd::Ended) => info!("Event stream ended by server"),
                Err(e) => warn!(error = %e, "Event stream failed"),
            }
            self.set_connected(false);

            let delay = self.backoff.next_delay();
            debug!(delay_ms = delay.as_millis(), "Reconnecting after delay");
            tokio::select! {
                () = self.stop_requested() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.set_connected(false);
        info!(session = self.session, "Subscription loop stopped");
    }

    async fn connect_and_read(&mut self) -> ClientResult<StreamEnd> {
        let request = self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send();

        let response = tokio::select! {
            biased;
            () = self.stop_requested() => return Ok(StreamEnd::Stopped),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ConnectionFailed(format!(
                "event stream returned HTTP {status}"
            )));
        }

        self.backoff.reset();
        self.stats.connections.fetch_add(1, Ordering::Relaxed);
        self.set_connected(true);

        let mut body = response.bytes_stream();
        let mut parser = SseLineBuffer::new();

        loop {
            let chunk = tokio::select! {
                biased;
                () = self.stop_requested() => return Ok(StreamEnd::Stopped),
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for frame in parser.feed(&bytes) {
                        self.handle_frame(frame);
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    for frame in parser.finish() {
                        self.handle_frame(frame);
                    }
                    return Ok(StreamEnd::Ended);
                }
            }
        }
    }

    fn handle_frame(&self, frame: SseFrame) {
        match frame {
            SseFrame::Comment(comment) => match comment.as_str() {
                CONNECTED_COMMENT => debug!("Subscription established"),
                KEEPALIVE_COMMENT => trace!("Keepalive received"),
                other => trace!(comment = other, "Ignoring comment"),
            },
            SseFrame::Data(data) => match Envelope::decode(&data) {
                Ok(envelope) => self.push(envelope),
                Err(e) => warn!(error = %e, "Dropping undecodable event"),
            },
        }
    }

    fn push(&self, envelope: Envelope) {
        if !self.is_current() {
            trace!(session = self.session, "Session superseded; dropping event");
            return;
        }
        match self.events.try_send((self.session, envelope)) {
            Ok(()) => {
                self.stats.received_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped_events.fetch_add(1, Ordering::Relaxed);
                debug!("Event queue full; dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                trace!("Event queue closed; dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_to_ceiling_and_resets() {
        let mut backoff = Backoff::new(BackoffConfig {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(1),
        });

        let delays: Vec<_> = (0..4).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![250, 500, 1000, 1000]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
    }
}
