//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Bind listener → Spawn monitor → [startup wait] → Serve
//!
//! Signals (signals.rs):
//!     Ignore set → SIG_IGN at the OS level
//!     Every other catchable signal → logged; trap set → hand off to shutdown
//!
//! Shutdown (shutdown.rs):
//!     Running → PendingShutdown (grace period) → Draining → Closed
//!     Closed fires the ShutdownSignal that main blocks on
//! ```
//!
//! # Design Decisions
//! - Shutdown is never immediate: the pre-shutdown grace period always runs
//! - Drain failures are logged; Closed is always reached
//! - The process exits only after Closed is observed

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Drain, DrainError, Phase, ShutdownOrchestrator, ShutdownSignal};
pub use signals::{SignalEvent, SignalMonitor};
