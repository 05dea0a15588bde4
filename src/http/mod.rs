//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum-server)
//!     → server.rs (router, trace layer, connect info)
//!     → handlers.rs (fixed response with injected latency, or /echo)
//!     → request.rs (header/form introspection, bearer token decoding)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::AppState;
pub use server::HttpServer;
