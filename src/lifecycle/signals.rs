//! OS signal handling.
//!
//! # Responsibilities
//! - Suppress the platform ignore set at the OS level (SIG_IGN)
//! - Receive every other catchable signal, one at a time
//! - Recognize the configured trap set and report the first match
//!
//! # Design Decisions
//! - Uses signal-hook-tokio so signals arrive as an async stream
//! - The source is generic over `Stream<Item = i32>` for tests
//! - An empty trap set installs no handlers, leaving default OS behavior

use std::collections::BTreeSet;
use std::fmt;
use std::future;
use std::io;

use futures_util::{Stream, StreamExt};
use nix::sys::signal::{SigHandler, Signal};
use signal_hook_tokio::Signals;

use crate::config::ServerConfig;

/// Signals that must never reach application logic on this platform.
#[cfg(target_os = "linux")]
pub const IGNORED: &[i32] = &[Signal::SIGURG as i32];
#[cfg(not(target_os = "linux"))]
pub const IGNORED: &[i32] = &[];

/// Synchronous fault signals; a returning handler would re-run the fault.
const SYNCHRONOUS: &[i32] = &[
    Signal::SIGABRT as i32,
    Signal::SIGBUS as i32,
    Signal::SIGSYS as i32,
    Signal::SIGTRAP as i32,
];

/// A signal delivered to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    number: i32,
}

impl SignalEvent {
    pub fn new(number: i32) -> Self {
        Self { number }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn name(&self) -> &'static str {
        signal_name(self.number)
    }
}

impl fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.number, self.name())
    }
}

/// Platform name of a signal number, `"UNKNOWN"` when it has none.
pub fn signal_name(number: i32) -> &'static str {
    Signal::try_from(number)
        .map(Signal::as_str)
        .unwrap_or("UNKNOWN")
}

/// Every signal a handler can be installed for, minus the ignore set.
pub fn watched_signals() -> Vec<i32> {
    Signal::iterator()
        .map(|s| s as i32)
        .filter(|n| !signal_hook::consts::FORBIDDEN.contains(n))
        .filter(|n| !SYNCHRONOUS.contains(n))
        .filter(|n| !IGNORED.contains(n))
        .collect()
}

/// Set the disposition of `signals` to SIG_IGN.
pub fn ignore(signals: &[i32]) -> io::Result<()> {
    for &number in signals {
        let signal = Signal::try_from(number)?;
        // SAFETY: SIG_IGN installs no user code as the handler.
        unsafe { nix::sys::signal::signal(signal, SigHandler::SigIgn) }?;
        tracing::debug!(signal = %SignalEvent::new(number), "Signal ignored");
    }
    Ok(())
}

/// Background listener that resolves once a trap signal is received.
pub struct SignalMonitor<S> {
    source: Option<S>,
    trap: BTreeSet<i32>,
}

impl SignalMonitor<Signals> {
    /// Ignore the platform ignore set and, when graceful shutdown is
    /// enabled, start receiving every watched signal.
    pub fn install(config: &ServerConfig) -> io::Result<Self> {
        ignore(IGNORED)?;

        if !config.graceful_shutdown_enabled() {
            tracing::info!("Graceful shutdown disabled, no signals trapped");
            return Ok(Self {
                source: None,
                trap: BTreeSet::new(),
            });
        }

        let trap = &config.trap_signals;
        let watched = watched_signals();
        for number in trap.iter().filter(|n| !watched.contains(*n)) {
            tracing::warn!(
                signal = %SignalEvent::new(*number),
                "Trap signal cannot be received and will never trigger shutdown"
            );
        }

        let signals = Signals::new(watched)?;
        Ok(Self {
            source: Some(signals),
            trap: trap.clone(),
        })
    }
}

impl<S> SignalMonitor<S>
where
    S: Stream<Item = i32> + Unpin,
{
    /// Monitor an arbitrary stream of signal numbers.
    pub fn with_source(source: S, trap: BTreeSet<i32>) -> Self {
        Self {
            source: Some(source),
            trap,
        }
    }

    /// Whether a signal number belongs to the trap set.
    pub fn is_trapped(&self, number: i32) -> bool {
        self.trap.contains(&number)
    }

    /// Receive signals until one in the trap set arrives.
    ///
    /// Never resolves when the trap set is empty or the source ends.
    pub async fn wait_for_trap(mut self) -> SignalEvent {
        let Some(mut source) = self.source.take().filter(|_| !self.trap.is_empty()) else {
            return future::pending().await;
        };

        while let Some(number) = source.next().await {
            let event = SignalEvent::new(number);
            tracing::info!(signal = %event, "Signal received");
            if self.is_trapped(number) {
                return event;
            }
        }

        tracing::warn!("Signal stream closed, graceful shutdown unavailable");
        future::pending().await
    }
}
