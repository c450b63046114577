//! Error type shared by the transport and the protocol client.

use sysbridge_core::CodecError;
use thiserror::Error;

/// Errors surfaced by a connector session.
///
/// Server-reported problems that do not end the session (such as a listener
/// already being registered) are logged inside the receive loop and never
/// become a `ConnectorError`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    /// The socket could not be opened, or failed while open (handshake, TCP,
    /// name resolution, protocol fault, heartbeat timeout).
    #[error("connection error: {0}")]
    Connection(String),

    /// The session is not open, or the backend closed it.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A frame arrived that is not a text frame holding a valid envelope.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The backend rejected the API key.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A receive loop is already running on this client.
    #[error("a receive loop is already running on this client")]
    ListenerBusy,
}

impl ConnectorError {
    pub(crate) fn not_connected() -> Self {
        ConnectorError::ConnectionClosed("Connection is closed".to_string())
    }

    pub(crate) fn closed_by_server() -> Self {
        ConnectorError::ConnectionClosed("Connection closed to server".to_string())
    }

    /// Whether the owner may reasonably call `connect()` again after this
    /// error.  A rejected key will be rejected again; a busy listener is a
    /// caller bug.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectorError::Connection(_)
                | ConnectorError::ConnectionClosed(_)
                | ConnectorError::MalformedMessage(_)
        )
    }
}

impl From<CodecError> for ConnectorError {
    fn from(err: CodecError) -> Self {
        ConnectorError::MalformedMessage(err.to_string())
    }
}
