//! The transport seam between the protocol client and the socket.
//!
//! [`crate::application::ProtocolClient`] never touches a WebSocket directly.
//! It talks to anything implementing [`Transport`], which lets the command and
//! dispatch logic be tested against a mock that records (or forbids) sends.
//! The production implementation is
//! [`crate::infrastructure::websocket::WebSocketTransport`].

use async_trait::async_trait;
use sysbridge_core::InboundEnvelope;

use crate::domain::ConnectorError;

/// One persistent, message-oriented connection to the backend.
///
/// Every method takes `&self` so a transport can be shared between a task
/// that listens and tasks that issue commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the connection.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::Connection`] on handshake, TCP, or name resolution
    /// failure.
    async fn connect(&self) -> Result<(), ConnectorError>;

    /// `true` while a connection exists and neither side has closed it.
    fn is_connected(&self) -> bool;

    /// Queues one text frame.  Frames are delivered in call order.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::ConnectionClosed`] when not connected.
    async fn send(&self, text: String) -> Result<(), ConnectorError>;

    /// Suspends until the next inbound envelope.
    ///
    /// Control frames (ping/pong) are consumed internally and never surface.
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::ConnectionClosed`] when the session is closed by
    ///   either side, including a local [`Transport::close`] while suspended.
    /// - [`ConnectorError::Connection`] for protocol faults and heartbeat
    ///   timeouts.
    /// - [`ConnectorError::MalformedMessage`] for binary or undecodable frames.
    async fn receive(&self) -> Result<InboundEnvelope, ConnectorError>;

    /// Closes the connection if open.  Idempotent; never fails.
    async fn close(&self);
}
