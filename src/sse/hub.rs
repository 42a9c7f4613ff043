// ABOUTME: Broadcast hub holding one bounded outbound queue per subscriber
// ABOUTME: Fans serialized event envelopes out without blocking on slow subscribers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Broadcast hub
//!
//! Every subscriber owns a bounded queue. A broadcast serializes the event
//! once and offers the same frame to each queue with `try_send`: a full queue
//! loses that event for that subscriber only, and the caller never waits.
//!
//! The registry lock is a synchronous `RwLock` so that a subscription's drop
//! guard can unregister without an async context. It is never held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use mcp_stream_core::envelope::error_codes;
use mcp_stream_core::{event_types, Envelope, ErrorBody, EventPayload};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifier assigned to a subscriber at registration
pub type SubscriberId = Uuid;

/// One serialized envelope, shared by every queue it is offered to
pub type Frame = Arc<str>;

struct Subscriber {
    sender: mpsc::Sender<Frame>,
    connected_at: DateTime<Utc>,
}

/// Receiving side of a registration
#[derive(Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    receiver: mpsc::Receiver<Frame>,
}

impl SubscriberHandle {
    /// Identifier to pass to [`BroadcastHub::unregister`]
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next queued frame; `None` once the hub has dropped this subscriber
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Queued frame if one is ready
    ///
    /// # Errors
    ///
    /// Returns `Empty` when nothing is queued and `Disconnected` once the hub
    /// has dropped this subscriber
    pub fn try_recv(&mut self) -> Result<Frame, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Split into identifier and receiver
    #[must_use]
    pub fn into_parts(self) -> (SubscriberId, mpsc::Receiver<Frame>) {
        (self.id, self.receiver)
    }
}

/// Registry of live subscribers and the fan-out entry point
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    capacity: usize,
    shutdown: CancellationToken,
    dropped_events: AtomicU64,
}

impl BroadcastHub {
    /// Hub whose subscriber queues hold `capacity` pending frames
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            shutdown: CancellationToken::new(),
            dropped_events: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SubscriberId, Subscriber>> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SubscriberId, Subscriber>> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a subscriber with a fresh bounded queue
    ///
    /// After [`Self::close_all`] the returned handle's queue is already
    /// closed, so its first `recv` yields `None`.
    #[must_use]
    pub fn register(&self) -> SubscriberHandle {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = Uuid::new_v4();

        let mut subscribers = self.write();
        if self.shutdown.is_cancelled() {
            debug!(subscriber.id = %id, "Registration after shutdown; queue closed immediately");
            return SubscriberHandle { id, receiver };
        }
        subscribers.insert(
            id,
            Subscriber {
                sender,
                connected_at: Utc::now(),
            },
        );
        let total = subscribers.len();
        drop(subscribers);

        info!(subscriber.id = %id, subscribers = total, "Registered subscriber");
        SubscriberHandle { id, receiver }
    }

    /// Remove a subscriber; returns whether it was still registered
    pub fn unregister(&self, id: SubscriberId) -> bool {
        self.remove(id, "Unregistered subscriber")
    }

    /// Drop a subscriber from the hub side, closing its queue
    pub fn evict(&self, id: SubscriberId) -> bool {
        self.remove(id, "Evicted subscriber")
    }

    fn remove(&self, id: SubscriberId, message: &str) -> bool {
        let mut subscribers = self.write();
        let removed = subscribers.remove(&id);
        let total = subscribers.len();
        drop(subscribers);

        let Some(subscriber) = removed else {
            return false;
        };
        let connected_secs = (Utc::now() - subscriber.connected_at).num_seconds();
        info!(subscriber.id = %id, subscribers = total, connected_secs, "{message}");
        true
    }

    /// Publish `payload` under `event_type` to every subscriber
    ///
    /// Returns the number of queues the event was placed on.
    pub fn broadcast(&self, event_type: &str, payload: &impl Serialize) -> usize {
        let frame = match EventPayload::envelope(event_type, payload).and_then(|e| e.encode()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(event_type, error = %e, "Failed to encode event payload");
                let body = ErrorBody::new(
                    error_codes::INTERNAL_ERROR,
                    format!("failed to encode '{event_type}' event"),
                );
                return self.broadcast_error(&body);
            }
        };
        self.fan_out(event_type, frame.into())
    }

    /// Publish a failure to every subscriber
    ///
    /// Returns the number of queues the event was placed on.
    pub fn broadcast_error(&self, error: &ErrorBody) -> usize {
        match Envelope::<Value>::from_error(error.clone()).encode() {
            Ok(frame) => self.fan_out(event_types::ERROR, frame.into()),
            Err(e) => {
                warn!(error = %e, "Failed to encode error event");
                0
            }
        }
    }

    fn fan_out(&self, event_type: &str, frame: Frame) -> usize {
        let subscribers = self.read();
        let mut delivered = 0;

        for (id, subscriber) in subscribers.iter() {
            match subscriber.sender.try_send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    self.dropped_events.fetch_add(1, Ordering::Relaxed);
                    debug!(subscriber.id = %id, event_type, "Subscriber queue full; event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber.id = %id, "Subscriber queue closed; awaiting unregister");
                }
            }
        }

        debug!(
            event_type,
            delivered,
            subscribers = subscribers.len(),
            "Broadcast event"
        );
        delivered
    }

    /// Close every subscriber queue and refuse further registrations
    ///
    /// Returns the number of subscribers that were closed.
    pub fn close_all(&self) -> usize {
        let mut subscribers = self.write();
        self.shutdown.cancel();
        let closed = subscribers.len();
        subscribers.clear();
        drop(subscribers);

        info!(closed, "Closed all subscriber queues");
        closed
    }

    /// Token cancelled by [`Self::close_all`]
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether [`Self::close_all`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.read().len()
    }

    /// Events dropped because a subscriber queue was full
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("subscribers", &self.subscriber_count())
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .field("dropped_events", &self.dropped_events())
            .finish()
    }
}
