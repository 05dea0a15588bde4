//! Connection draining.
//!
//! # Responsibilities
//! - Stop the accept loop when shutdown starts
//! - Wait for open connections to finish, optionally bounded
//! - Abort connections that outlive the deadline

use std::time::Duration;

use async_trait::async_trait;
use axum_server::Handle;

use crate::lifecycle::shutdown::{Drain, DrainError};

/// How often the open connection count is checked while draining.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drains the connections of a server started with the same `Handle`.
#[derive(Debug, Clone)]
pub struct ConnectionDrain {
    handle: Handle,
}

impl ConnectionDrain {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Get current open connection count.
    pub fn active_count(&self) -> usize {
        self.handle.connection_count()
    }

    /// Wait until all connections are closed.
    async fn wait_for_idle(&self) {
        while self.handle.connection_count() > 0 {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Drain for ConnectionDrain {
    async fn drain(&self, deadline: Option<Duration>) -> Result<(), DrainError> {
        tracing::info!(
            active_connections = self.active_count(),
            "Stopped accepting connections"
        );
        // axum-server aborts whatever is still open once the deadline passes.
        self.handle.graceful_shutdown(deadline);

        match deadline {
            None => {
                self.wait_for_idle().await;
                Ok(())
            }
            Some(limit) => tokio::time::timeout(limit, self.wait_for_idle())
                .await
                .map_err(|_| DrainError::DeadlineExceeded {
                    limit,
                    remaining: self.active_count(),
                }),
        }
    }
}
