//! Request simulators.
//!
//! - `fixed_handler`: sleeps for the configured delay, then writes the
//!   configured body. Used to test timeouts and health-check thresholds.
//! - `echo_handler`: reports the request back as indented JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::config::ServerConfig;
use crate::http::request::{is_form_submission, EchoReport};

/// Largest form body the echo handler reads.
const MAX_FORM_BYTES: usize = 10 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

/// `GET /` (and any path other than `/echo`).
pub async fn fixed_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> Response {
    log_access(&state.config, remote, &method, &uri);
    tokio::time::sleep(state.config.response_sleep).await;
    Response::new(Body::from(state.config.response_body.clone()))
}

/// `GET /echo`.
pub async fn echo_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    log_access(&state.config, remote, &parts.method, &parts.uri);

    let body = if is_form_submission(&parts.method, &parts.headers) {
        match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read form body");
                Bytes::new()
            }
        }
    } else {
        Bytes::new()
    };

    let report = EchoReport::new(&parts, remote, &body);
    match report.to_pretty_json() {
        Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize echo response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn log_access(config: &ServerConfig, remote: SocketAddr, method: &Method, uri: &Uri) {
    if config.access_log {
        tracing::info!(target: "access", "{} {} {}", remote, method, uri);
    }
}
