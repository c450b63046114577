//! Application layer for the connector.
//!
//! Holds the protocol logic (what to send, how to dispatch what arrives) and
//! the [`Transport`] trait it runs over.  Nothing in here opens a socket, so
//! all of it is tested against a mock transport.

pub mod protocol_client;
pub mod transport;

pub use protocol_client::ProtocolClient;
pub use transport::Transport;
