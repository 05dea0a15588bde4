//! Startup orchestration.
//!
//! # Responsibilities
//! - Print the resolved configuration
//! - Bind the listener before anything else can fail late
//! - Spawn the signal monitor and shutdown orchestrator
//! - Apply the startup wait, serve, and block until shutdown completes
//!
//! # Design Decisions
//! - Fail fast: bind and signal registration errors are fatal
//! - The listener is bound before the startup wait, so early clients queue
//! - Serving returning is not enough; `Closed` must be observed before exit

use std::fmt::Write;
use std::io;
use std::sync::Arc;

use axum_server::Handle;
use futures_util::Stream;

use crate::config::duration::format_duration;
use crate::config::loader::{
    ACCESS_LOG, GRACE_PERIOD_BEFORE_SHUTDOWN, GRACE_PERIOD_DURING_SHUTDOWN, LISTEN_ADDR,
    RESPONSE_BODY, RESPONSE_SLEEP, STARTUP_WAIT, TRAP_SIGNALS,
};
use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{ShutdownOrchestrator, ShutdownSignal};
use crate::lifecycle::signals::{signal_name, SignalMonitor};
use crate::net::{ConnectionDrain, Listener};

/// Run the server with real OS signals until a trap signal shuts it down.
pub async fn run(config: Arc<ServerConfig>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = Listener::bind(config.listen_addr)?;
    let monitor = SignalMonitor::install(&config)?;
    serve(config, listener, monitor).await?;
    Ok(())
}

/// Serve `listener` while `monitor` waits for a trap signal.
///
/// Resolves after the orchestrator has reached `Closed`.
pub async fn serve<S>(
    config: Arc<ServerConfig>,
    listener: Listener,
    monitor: SignalMonitor<S>,
) -> io::Result<()>
where
    S: Stream<Item = i32> + Unpin + Send + 'static,
{
    let handle = Handle::new();
    let done = ShutdownSignal::new();
    let orchestrator = ShutdownOrchestrator::new(
        ConnectionDrain::new(handle.clone()),
        &config,
        done.clone(),
    );

    tokio::spawn(async move {
        let trigger = monitor.wait_for_trap().await;
        orchestrator.run(trigger).await;
    });

    if !config.startup_wait.is_zero() {
        tracing::info!(startup_wait = %format_duration(config.startup_wait), "Waiting for startup");
        tokio::time::sleep(config.startup_wait).await;
    }

    tracing::info!("Server start");
    HttpServer::new(Arc::clone(&config))
        .run(listener.into_std(), handle)
        .await?;

    done.wait().await;
    Ok(())
}

/// Human-readable dump of the build and resolved configuration.
pub fn banner(config: &ServerConfig) -> String {
    let trap_signals: Vec<&str> = config.trap_signals.iter().map(|&n| signal_name(n)).collect();

    let mut out = String::new();
    out.push_str("###################### Info #######################\n");
    out.push_str(concat!(env!("CARGO_PKG_NAME"), "\n"));
    field(&mut out, "Version", env!("CARGO_PKG_VERSION"));
    field(&mut out, "PID", std::process::id());
    out.push_str("################## Configuration ##################\n");
    field(&mut out, LISTEN_ADDR, &config.listen_addr);
    field(&mut out, STARTUP_WAIT, format_duration(config.startup_wait));
    field(&mut out, RESPONSE_BODY, String::from_utf8_lossy(&config.response_body));
    field(&mut out, RESPONSE_SLEEP, format_duration(config.response_sleep));
    field(&mut out, TRAP_SIGNALS, format!("[{}]", trap_signals.join(" ")));
    field(
        &mut out,
        GRACE_PERIOD_BEFORE_SHUTDOWN,
        format_duration(config.grace_period_before_shutdown),
    );
    field(
        &mut out,
        GRACE_PERIOD_DURING_SHUTDOWN,
        format_duration(config.grace_period_during_shutdown),
    );
    field(&mut out, ACCESS_LOG, config.access_log);
    out.push_str("###################################################\n");
    out
}

fn field(out: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{:<29}{}", key, value);
}
