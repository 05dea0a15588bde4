//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (lifecycle transitions, signals, drain progress)
//!     → access log lines (target "access", when ACCESS_LOG=true)
//!     → tower-http request spans
//!
//! Consumers:
//!     → stdout via the fmt layer
//! ```

pub mod logging;
