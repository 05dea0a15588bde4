//! Configuration loading from the process environment.

use std::collections::BTreeSet;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use axum::body::Bytes;

use crate::config::duration::{parse_duration, DurationError};
use crate::config::schema::ServerConfig;

pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const STARTUP_WAIT: &str = "STARTUP_WAIT";
pub const RESPONSE_BODY: &str = "RESPONSE_BODY";
pub const RESPONSE_SLEEP: &str = "RESPONSE_SLEEP";
pub const TRAP_SIGNALS: &str = "TRAP_SIGNALS";
pub const GRACE_PERIOD_BEFORE_SHUTDOWN: &str = "GRACE_PERIOD_BEFORE_SHUTDOWN";
pub const GRACE_PERIOD_DURING_SHUTDOWN: &str = "GRACE_PERIOD_DURING_SHUTDOWN";
pub const ACCESS_LOG: &str = "ACCESS_LOG";

/// `TRAP_SIGNALS` value that turns the graceful shutdown path off.
const TRAP_DISABLED: &str = "0";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} {value:?}: {source}")]
    Duration {
        var: &'static str,
        value: String,
        #[source]
        source: DurationError,
    },
    #[error("invalid {var} {value:?}: {source}")]
    ListenAddr {
        var: &'static str,
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("invalid {var}: {entry:?} is not a signal number")]
    Signal { var: &'static str, entry: String },
}

/// Resolve configuration from the process environment.
pub fn from_env() -> Result<ServerConfig, ConfigError> {
    resolve(|name| std::env::var(name).ok())
}

/// Resolve configuration through `lookup`, applying defaults for every
/// variable that is missing or empty.
pub fn resolve<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let defaults = ServerConfig::default();

    let duration = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
        match get(var) {
            None => Ok(default),
            Some(value) => parse_duration(&value).map_err(|source| ConfigError::Duration {
                var,
                value,
                source,
            }),
        }
    };

    let listen_addr = match get(LISTEN_ADDR) {
        None => defaults.listen_addr,
        Some(value) => parse_listen_addr(&value).map_err(|source| ConfigError::ListenAddr {
            var: LISTEN_ADDR,
            value,
            source,
        })?,
    };

    let trap_signals = match get(TRAP_SIGNALS) {
        None => defaults.trap_signals,
        Some(value) => parse_signal_list(&value)?,
    };

    Ok(ServerConfig {
        listen_addr,
        startup_wait: duration(STARTUP_WAIT, defaults.startup_wait)?,
        response_body: get(RESPONSE_BODY)
            .map(Bytes::from)
            .unwrap_or(defaults.response_body),
        response_sleep: duration(RESPONSE_SLEEP, defaults.response_sleep)?,
        trap_signals,
        grace_period_before_shutdown: duration(
            GRACE_PERIOD_BEFORE_SHUTDOWN,
            defaults.grace_period_before_shutdown,
        )?,
        grace_period_during_shutdown: duration(
            GRACE_PERIOD_DURING_SHUTDOWN,
            defaults.grace_period_during_shutdown,
        )?,
        access_log: get(ACCESS_LOG).is_some_and(|v| v == "true"),
    })
}

/// Parse `host:port`; a bare `:port` binds all interfaces.
fn parse_listen_addr(value: &str) -> Result<SocketAddr, AddrParseError> {
    match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse(),
        None => value.parse(),
    }
}

fn parse_signal_list(value: &str) -> Result<BTreeSet<i32>, ConfigError> {
    if value == TRAP_DISABLED {
        return Ok(BTreeSet::new());
    }
    value
        .split(',')
        .map(|entry| {
            entry.parse::<i32>().map_err(|_| ConfigError::Signal {
                var: TRAP_SIGNALS,
                entry: entry.to_string(),
            })
        })
        .collect()
}
