// ABOUTME: Per-connection subscription stream bridging one hub queue to one SSE response
// ABOUTME: Emits the connected comment, queued events and keepalives until the queue or server closes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Subscription stream
//!
//! The stream registers with the hub when built and sends `: connected`
//! first. It then waits on three sources at once:
//!
//! - server shutdown: the stream ends
//! - the subscriber queue: each frame is sent as one `data:` event, and a
//!   closed queue ends the stream
//! - the heartbeat timer: a `: keepalive` comment
//!
//! A peer disconnect surfaces as the response body being dropped; the
//! [`SubscriptionGuard`] captured by the stream then unregisters.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::stream::Stream;
use mcp_stream_core::frame::{CONNECTED_COMMENT, KEEPALIVE_COMMENT};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::hub::{BroadcastHub, Frame, SubscriberId};

/// Why a subscription stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The hub closed or evicted the subscriber queue
    QueueClosed,
    /// The server began shutting down
    Shutdown,
    /// The response body was dropped before the stream finished
    PeerDisconnected,
}

/// Unregisters its subscriber exactly once, on close or on drop
#[derive(Debug)]
pub struct SubscriptionGuard {
    hub: Arc<BroadcastHub>,
    id: SubscriberId,
    released: bool,
}

impl SubscriptionGuard {
    /// Guard for a subscriber already registered with `hub`
    #[must_use]
    pub fn new(hub: Arc<BroadcastHub>, id: SubscriberId) -> Self {
        Self {
            hub,
            id,
            released: false,
        }
    }

    /// Unregister and record why; later calls do nothing
    pub fn close(&mut self, reason: CloseReason) {
        if self.released {
            return;
        }
        self.released = true;
        self.hub.unregister(self.id);
        info!(subscriber.id = %self.id, reason = ?reason, "Subscription closed");
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.close(CloseReason::PeerDisconnected);
    }
}

const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

enum Step {
    Deliver(Frame),
    Heartbeat,
    Close(CloseReason),
}

/// Register with `hub` and build the event stream for one SSE response
pub fn subscription_stream(
    hub: Arc<BroadcastHub>,
    heartbeat: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let heartbeat = heartbeat.max(MIN_HEARTBEAT);
    let (id, mut receiver) = hub.register().into_parts();
    let shutdown = hub.shutdown_token();
    let mut guard = SubscriptionGuard::new(hub, id);

    async_stream::stream! {
        yield Ok(Event::default().comment(CONNECTED_COMMENT));

        let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let step = tokio::select! {
                biased;
                () = shutdown.cancelled() => Step::Close(CloseReason::Shutdown),
                frame = receiver.recv() => frame.map_or(Step::Close(CloseReason::QueueClosed), Step::Deliver),
                _ = ticker.tick() => Step::Heartbeat,
            };

            match step {
                Step::Deliver(frame) => yield Ok(Event::default().data(&*frame)),
                Step::Heartbeat => {
                    debug!(subscriber.id = %id, "Sending keepalive");
                    yield Ok(Event::default().comment(KEEPALIVE_COMMENT));
                }
                Step::Close(reason) => {
                    guard.close(reason);
                    break;
                }
            }
        }
    }
}
