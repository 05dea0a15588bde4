//! Shared utilities for integration testing.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, Stream};
use testserver::lifecycle::startup;
use testserver::lifecycle::SignalMonitor;
use testserver::net::Listener;
use testserver::ServerConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const SIGHUP: i32 = 1;
pub const SIGINT: i32 = 2;
pub const SIGTERM: i32 = 15;

type SignalSource = Pin<Box<dyn Stream<Item = i32> + Send>>;

/// A server on an ephemeral loopback port fed by synthetic signals.
pub struct TestServer {
    pub addr: SocketAddr,
    signals: mpsc::UnboundedSender<i32>,
    pub task: JoinHandle<io::Result<()>>,
}

impl TestServer {
    pub fn start(config: ServerConfig) -> Self {
        let listener = Listener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        let addr = listener.local_addr();

        let (tx, rx) = mpsc::unbounded_channel();
        let source: SignalSource = Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|n| (n, rx))
        }));
        let monitor = SignalMonitor::with_source(source, config.trap_signals.clone());

        let task = tokio::spawn(startup::serve(Arc::new(config), listener, monitor));
        Self {
            addr,
            signals: tx,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Deliver a signal number; dropped once the monitor has stopped.
    pub fn send_signal(&self, number: i32) {
        let _ = self.signals.send(number);
    }

    /// Wait for the server to finish shutting down.
    pub async fn join(self, limit: Duration) -> io::Result<()> {
        tokio::time::timeout(limit, self.task)
            .await
            .expect("server did not shut down in time")
            .expect("server task panicked")
    }
}

/// A client that never reuses connections or consults proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Configuration with short delays suitable for tests.
pub fn quick_config() -> ServerConfig {
    ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        response_sleep: Duration::ZERO,
        grace_period_before_shutdown: Duration::from_millis(50),
        ..ServerConfig::default()
    }
}
