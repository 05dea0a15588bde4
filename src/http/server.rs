//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with both handlers
//! - Wire up middleware (tracing)
//! - Serve a pre-bound listener until the shared handle shuts it down

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::{routing::any, Router};
use axum_server::Handle;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::handlers::{echo_handler, fixed_handler, AppState};

/// HTTP server for the test endpoint.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let state = AppState {
            config: Arc::clone(&config),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// `/echo` introspects the request; every other path gets the fixed body.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/echo", any(echo_handler))
            .fallback(fixed_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve `listener` until `handle` shuts the server down.
    ///
    /// Returns `Ok(())` once a graceful or forced shutdown has closed the
    /// listener and every connection.
    pub async fn run(self, listener: TcpListener, handle: Handle) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            access_log = self.config.access_log,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum_server::from_tcp(listener)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
