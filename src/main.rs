//! testserver
//!
//! An HTTP endpoint whose latency and shutdown behavior are controlled
//! through environment variables.
//!
//! # Lifecycle
//!
//! ```text
//!   env ──▶ config ──▶ bind ──▶ [STARTUP_WAIT] ──▶ serve ────────────┐
//!                        │                           ▲                │
//!                        ▼                           │ drain          ▼
//!                  signal monitor ──trap──▶ [GRACE_PERIOD_BEFORE] ──▶ Closed ──▶ exit 0
//! ```

use std::sync::Arc;

use testserver::config;
use testserver::lifecycle::startup;
use testserver::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init();

    let config = Arc::new(config::from_env()?);
    print!("{}", startup::banner(&config));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
