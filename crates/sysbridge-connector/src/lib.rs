//! sysbridge-connector library crate.
//!
//! A client for the System Bridge backend API: it opens the backend's
//! WebSocket, sends typed commands authenticated with a pre-shared API key,
//! and turns the backend's JSON notifications into typed module events.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Caller (CLI, embedding application)
//!         ↕  commands / (Module, ModulePayload) events
//! [sysbridge-connector]
//!   ├── domain/           ConnectorConfig, ApiKey, ConnectorError
//!   ├── application/      Transport trait, ProtocolClient
//!   └── infrastructure/
//!         ├── websocket/  WebSocketTransport (tokio-tungstenite + heartbeat)
//!         └── settings/   Optional TOML settings file
//!         ↕
//! System Bridge backend  (JSON over WebSocket, ws://host:9170/api/websocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `sysbridge-core` only; it talks to
//!   the network through the [`application::Transport`] trait, which tests
//!   replace with a mock.
//! - `infrastructure` supplies the real transport and file access.
//!
//! # For beginners: typical use
//!
//! ```no_run
//! use sysbridge_connector::domain::{ApiKey, ConnectorConfig};
//! use sysbridge_connector::infrastructure::websocket_client;
//!
//! # async fn example() -> Result<(), sysbridge_connector::domain::ConnectorError> {
//! let client = websocket_client(&ConnectorConfig::new("127.0.0.1", 9170, ApiKey::new("key")));
//! client.connect().await?;
//! client.register_data_listener(&["battery", "display"]).await?;
//! client
//!     .listen(|module, payload| async move {
//!         println!("{module}: {payload:?}");
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration and error types (no I/O).
pub mod domain;

/// Application layer: the protocol client and its transport seam.
pub mod application;

/// Infrastructure layer: WebSocket transport and settings file.
pub mod infrastructure;

#[cfg(test)]
mod test_support;

pub use application::{ProtocolClient, Transport};
pub use domain::{ApiKey, ConnectorConfig, ConnectorError};
pub use infrastructure::{websocket_client, WebSocketClient, WebSocketTransport};
