//! Shutdown coordination for the server.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::config::duration::format_duration;
use crate::config::ServerConfig;
use crate::lifecycle::signals::SignalEvent;

/// Completion marker fired once the shutdown sequence has finished.
///
/// Cloning shares the same marker. Only the first `fire` has an effect;
/// later calls are no-ops for both the caller and every waiter.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Create an unfired marker.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the marker. Returns `true` only for the call that fired it.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the marker has been fired.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Shutdown state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Serving traffic, waiting for a trap signal.
    Running,
    /// Trap signal received, sleeping through the pre-shutdown grace period.
    PendingShutdown,
    /// No new connections; in-flight requests are finishing.
    Draining,
    /// Terminal. The ShutdownSignal has fired.
    Closed,
}

/// Error reported by a server while draining.
#[derive(Debug, thiserror::Error)]
pub enum DrainError {
    #[error("drain deadline of {limit:?} exceeded with {remaining} connection(s) still open")]
    DeadlineExceeded { limit: Duration, remaining: usize },
    #[error("server shutdown failed: {0}")]
    Io(#[from] io::Error),
}

/// A server that can stop accepting connections and drain in-flight ones.
#[async_trait]
pub trait Drain: Send + Sync {
    /// Stop accepting and wait for open connections to finish.
    ///
    /// With `Some(deadline)`, connections still open at the deadline are
    /// aborted and `DrainError::DeadlineExceeded` is returned.
    async fn drain(&self, deadline: Option<Duration>) -> Result<(), DrainError>;
}

/// Drives the server from `Running` to `Closed` after a trap signal.
pub struct ShutdownOrchestrator<D> {
    server: D,
    grace_period: Duration,
    drain_deadline: Option<Duration>,
    phase: watch::Sender<Phase>,
    done: ShutdownSignal,
}

impl<D: Drain> ShutdownOrchestrator<D> {
    pub fn new(server: D, config: &ServerConfig, done: ShutdownSignal) -> Self {
        let (phase, _) = watch::channel(Phase::Running);
        Self {
            server,
            grace_period: config.grace_period_before_shutdown,
            drain_deadline: config.drain_deadline(),
            phase,
            done,
        }
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Run the shutdown sequence for `trigger`. Always ends in `Closed`.
    pub async fn run(self, trigger: SignalEvent) {
        self.enter(Phase::PendingShutdown);
        tracing::info!(
            signal = %trigger,
            grace_period = %format_duration(self.grace_period),
            "Waiting for shutdown"
        );
        tokio::time::sleep(self.grace_period).await;

        self.enter(Phase::Draining);
        match self.drain_deadline {
            None => tracing::info!("Shutting down (grace period = unlimited)"),
            Some(deadline) => tracing::info!(
                grace_period = %format_duration(deadline),
                "Shutting down"
            ),
        }
        if let Err(e) = self.server.drain(self.drain_deadline).await {
            tracing::error!(error = %e, "HTTP server shutdown");
        }

        self.enter(Phase::Closed);
        if !self.done.fire() {
            tracing::debug!("Shutdown signal already fired");
        }
    }

    fn enter(&self, next: Phase) {
        let previous = self.phase.send_replace(next);
        tracing::debug!(from = ?previous, to = ?next, "Shutdown phase changed");
    }
}
