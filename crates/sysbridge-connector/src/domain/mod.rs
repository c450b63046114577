//! Domain types for the connector: session configuration and the error type
//! every layer reports through.

pub mod config;
pub mod error;

pub use config::{ApiKey, ConnectorConfig, DEFAULT_HEARTBEAT, DEFAULT_PORT, WEBSOCKET_PATH};
pub use error::ConnectorError;
