//! Infrastructure layer: the real WebSocket transport and the settings file.

pub mod settings;
pub mod websocket;

pub use websocket::{websocket_client, WebSocketClient, WebSocketTransport};
