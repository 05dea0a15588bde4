//! Configuration schema definitions.
//!
//! `ServerConfig` is the single immutable value every subsystem reads from.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;

/// Signal number for SIGINT.
pub const SIGINT: i32 = 2;
/// Signal number for SIGTERM.
pub const SIGTERM: i32 = 15;

/// Root configuration for the test server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address. `:8080` in the environment resolves to `0.0.0.0:8080`.
    pub listen_addr: SocketAddr,

    /// Delay between binding the listener and serving the first request.
    pub startup_wait: Duration,

    /// Body written verbatim by the fixed-response handler.
    pub response_body: Bytes,

    /// Time the fixed-response handler sleeps before answering.
    pub response_sleep: Duration,

    /// Signal numbers that start a graceful shutdown. Empty disables it.
    pub trap_signals: BTreeSet<i32>,

    /// Delay between a trap signal and the start of the drain.
    pub grace_period_before_shutdown: Duration,

    /// Upper bound on the drain. Zero waits for every in-flight request.
    pub grace_period_during_shutdown: Duration,

    /// Log one line per request.
    pub access_log: bool,
}

impl ServerConfig {
    /// Drain deadline, or `None` when the drain is unbounded.
    pub fn drain_deadline(&self) -> Option<Duration> {
        if self.grace_period_during_shutdown.is_zero() {
            None
        } else {
            Some(self.grace_period_during_shutdown)
        }
    }

    /// Whether any signal can trigger the graceful shutdown path.
    pub fn graceful_shutdown_enabled(&self) -> bool {
        !self.trap_signals.is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            startup_wait: Duration::ZERO,
            response_body: Bytes::from_static(b"I'm a testserver"),
            response_sleep: Duration::from_millis(50),
            trap_signals: BTreeSet::from([SIGINT, SIGTERM]),
            grace_period_before_shutdown: Duration::from_secs(1),
            grace_period_during_shutdown: Duration::ZERO,
            access_log: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_drain_period_is_unbounded() {
        let config = ServerConfig::default();
        assert_eq!(config.drain_deadline(), None);

        let bounded = ServerConfig {
            grace_period_during_shutdown: Duration::from_secs(5),
            ..ServerConfig::default()
        };
        assert_eq!(bounded.drain_deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn empty_trap_set_disables_graceful_shutdown() {
        let config = ServerConfig {
            trap_signals: BTreeSet::new(),
            ..ServerConfig::default()
        };
        assert!(!config.graceful_shutdown_enabled());
        assert!(ServerConfig::default().graceful_shutdown_enabled());
    }
}
