//! Connector configuration types.
//!
//! [`ConnectorConfig`] carries everything a session needs: where the backend
//! listens, the pre-shared API key, and the heartbeat period.  It is a plain
//! struct with no environment reads; the CLI (or an embedding application)
//! is responsible for populating it.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Default TCP port of the System Bridge backend API.
pub const DEFAULT_PORT: u16 = 9170;

/// Path of the WebSocket endpoint on the backend.
pub const WEBSOCKET_PATH: &str = "/api/websocket";

/// Default WebSocket ping period.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);

/// The pre-shared API key.
///
/// Wrapped so it never ends up in logs: `Debug` prints a placeholder.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// All runtime configuration for one connector session.
///
/// # Example
///
/// ```rust
/// use sysbridge_connector::domain::{ApiKey, ConnectorConfig};
///
/// let cfg = ConnectorConfig::new("192.168.1.20", 9170, ApiKey::new("secret"));
/// assert_eq!(cfg.endpoint_url(), "ws://192.168.1.20:9170/api/websocket");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Hostname or IP address of the backend.
    pub host: String,
    pub port: u16,
    pub api_key: ApiKey,
    /// How often to send a WebSocket ping.  The session is considered dead
    /// when no pong arrives within half of this.  `Duration::ZERO` disables
    /// the heartbeat.
    pub heartbeat_interval: Duration,
}

impl ConnectorConfig {
    pub fn new(host: impl Into<String>, port: u16, api_key: ApiKey) -> Self {
        Self {
            host: host.into(),
            port,
            api_key,
            heartbeat_interval: DEFAULT_HEARTBEAT,
        }
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The full WebSocket URL, e.g. `ws://127.0.0.1:9170/api/websocket`.
    pub fn endpoint_url(&self) -> String {
        format!("ws://{}{}", self.endpoint(), WEBSOCKET_PATH)
    }
}

impl Default for ConnectorConfig {
    /// | Field              | Default     |
    /// |--------------------|-------------|
    /// | host               | `127.0.0.1` |
    /// | port               | `9170`      |
    /// | api_key            | empty       |
    /// | heartbeat_interval | 30 seconds  |
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT, ApiKey::default())
    }
}
