// ABOUTME: Ordered shutdown of the hub server: subscribers first, then the listener
// ABOUTME: Bounds the wait for in-flight connections with a deadline and reports the outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Server Lifecycle Management
//!
//! Shutdown runs in a fixed order:
//! 1. close every subscriber queue, so each open stream ends on its own
//! 2. stop accepting connections and start draining the listener
//! 3. wait for the server task, at most until the deadline
//!
//! Subscribers are closed before the listener drains: an open event stream
//! never completes by itself.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::sse::BroadcastHub;

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Accepting connections and broadcasting
    Running,
    /// Shutdown in progress
    ShuttingDown,
    /// Shutdown finished
    ShutDown,
}

/// Result of one shutdown request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownOutcome {
    /// Every connection drained before the deadline
    Completed {
        /// Subscribers closed in step one
        closed_subscribers: usize,
    },
    /// The deadline elapsed and the server task was aborted
    TimedOut {
        /// Subscribers closed in step one
        closed_subscribers: usize,
    },
    /// A previous request already shut the server down
    AlreadyShutDown,
}

/// Drives the shutdown sequence for one running server
pub struct LifecycleController {
    hub: Arc<BroadcastHub>,
    stop_accepting: CancellationToken,
    server_task: Mutex<Option<JoinHandle<io::Result<()>>>>,
    state: Mutex<LifecycleState>,
}

impl LifecycleController {
    /// Controller for a server task that stops accepting when `stop_accepting` fires
    #[must_use]
    pub fn new(
        hub: Arc<BroadcastHub>,
        stop_accepting: CancellationToken,
        server_task: JoinHandle<io::Result<()>>,
    ) -> Self {
        Self {
            hub,
            stop_accepting,
            server_task: Mutex::new(Some(server_task)),
            state: Mutex::new(LifecycleState::Running),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `Running` to `ShuttingDown`; false if shutdown already began
    fn begin_shutdown(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != LifecycleState::Running {
            return false;
        }
        *state = LifecycleState::ShuttingDown;
        true
    }

    fn finish_shutdown(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = LifecycleState::ShutDown;
    }

    /// Shut the server down, waiting at most `timeout` for connections to drain
    ///
    /// Later calls return [`ShutdownOutcome::AlreadyShutDown`] without
    /// repeating any step.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownOutcome {
        if !self.begin_shutdown() {
            info!("Shutdown already requested");
            return ShutdownOutcome::AlreadyShutDown;
        }

        info!(timeout_secs = timeout.as_secs_f64(), "Shutdown: closing subscribers");
        let closed_subscribers = self.hub.close_all();

        info!("Shutdown: stopping listener");
        self.stop_accepting.cancel();

        let task = self
            .server_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let outcome = match task {
            Some(task) => Self::await_server(task, timeout, closed_subscribers).await,
            None => ShutdownOutcome::Completed { closed_subscribers },
        };

        self.finish_shutdown();
        info!(outcome = ?outcome, "Shutdown finished");
        outcome
    }

    async fn await_server(
        mut task: JoinHandle<io::Result<()>>,
        timeout: Duration,
        closed_subscribers: usize,
    ) -> ShutdownOutcome {
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(Ok(()))) => ShutdownOutcome::Completed { closed_subscribers },
            Ok(Ok(Err(e))) => {
                error!(error = %e, "Server exited with an error during shutdown");
                ShutdownOutcome::Completed { closed_subscribers }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Server task failed during shutdown");
                ShutdownOutcome::Completed { closed_subscribers }
            }
            Err(_) => {
                warn!(
                    timeout_secs = timeout.as_secs_f64(),
                    "Shutdown deadline elapsed with connections still open; aborting server task"
                );
                task.abort();
                ShutdownOutcome::TimedOut { closed_subscribers }
            }
        }
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("state", &self.state())
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_order_and_idempotence() {
        let hub = Arc::new(BroadcastHub::new(4));
        let mut handle = hub.register();
        let stop = CancellationToken::new();

        let task_stop = stop.clone();
        let task = tokio::spawn(async move {
            task_stop.cancelled().await;
            Ok::<(), io::Error>(())
        });

        let controller = LifecycleController::new(Arc::clone(&hub), stop, task);
        assert_eq!(controller.state(), LifecycleState::Running);

        let outcome = controller.shutdown(Duration::from_secs(1)).await;
        assert_eq!(outcome, ShutdownOutcome::Completed { closed_subscribers: 1 });
        assert!(handle.recv().await.is_none());
        assert_eq!(controller.state(), LifecycleState::ShutDown);

        let again = controller.shutdown(Duration::from_secs(1)).await;
        assert_eq!(again, ShutdownOutcome::AlreadyShutDown);
    }

    #[tokio::test]
    async fn test_shutdown_times_out_on_stuck_server() {
        let hub = Arc::new(BroadcastHub::new(4));
        let task = tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok::<(), io::Error>(())
        });

        let controller = LifecycleController::new(hub, CancellationToken::new(), task);
        let outcome = controller.shutdown(Duration::from_millis(50)).await;
        assert_eq!(outcome, ShutdownOutcome::TimedOut { closed_subscribers: 0 });
    }
}
