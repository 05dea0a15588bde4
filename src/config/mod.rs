//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (LISTEN_ADDR, RESPONSE_SLEEP, ...)
//!     → loader.rs (lookup, defaults, typed parsing)
//!     → duration.rs (compound duration grammar)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never mutated
//! - Every setting has a default; an empty variable counts as unset
//! - Any malformed value is fatal before a socket is bound

pub mod duration;
pub mod loader;
pub mod schema;

pub use loader::{from_env, resolve, ConfigError};
pub use schema::ServerConfig;
