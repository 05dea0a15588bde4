//! Synthetic HTTP test endpoint with controllable latency and graceful
//! shutdown, for exercising load balancers, orchestrators and probes.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::ShutdownSignal;
