//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! LISTEN_ADDR
//!     → listener.rs (bind now, accept later)
//!     → axum-server accept loop (one task per connection)
//!     → connection.rs (connection count, graceful drain)
//!
//! Connection States:
//!     Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Binding happens before the startup wait so the port is reserved
//! - Drain is driven through the axum-server handle shared with the server

pub mod connection;
pub mod listener;

pub use connection::ConnectionDrain;
pub use listener::{Listener, ListenerError};
