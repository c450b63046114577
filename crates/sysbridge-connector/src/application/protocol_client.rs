//! Protocol client: typed commands out, typed module events in.
//!
//! # How the client works (for beginners)
//!
//! The backend speaks a small JSON protocol over one WebSocket:
//!
//! 1. **Commands** flow client → backend.  Each is fire-and-forget: the client
//!    encodes it with the API key and a fresh request id and hands it to the
//!    transport.  Any answer arrives later as an ordinary inbound message.
//! 2. **Notifications** flow backend → client.  The receive loop decodes each
//!    one, works out which data module it belongs to (via the
//!    [`ModelRegistry`]), decodes the payload into its typed model, and calls
//!    the user's callback with `(module, payload)`.
//!
//! Problems the backend reports about individual requests are logged and the
//! loop carries on.  Only two things end it: the connection going away, or
//! the backend rejecting the API key.
//!
//! Reconnection is left to the owner; see
//! [`ConnectorError::is_retryable`].

use std::convert::Infallible;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use sysbridge_core::protocol::messages::{subtype, OpenTarget};
use sysbridge_core::{
    encode_command, Command, InboundEnvelope, ModelRegistry, Module, ModulePayload, Notification,
};
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

use crate::application::transport::Transport;
use crate::domain::{ApiKey, ConnectorError};

/// A protocol session over some [`Transport`].
pub struct ProtocolClient<T: Transport> {
    transport: T,
    api_key: ApiKey,
    registry: ModelRegistry,
    /// Set while a receive loop owns the inbound stream.
    listening: AtomicBool,
    span: Span,
}

impl<T: Transport> ProtocolClient<T> {
    /// Creates a client over `transport`.  Nothing is connected yet.
    ///
    /// `endpoint` only labels this client's log span.
    pub fn new(transport: T, api_key: ApiKey, registry: ModelRegistry, endpoint: &str) -> Self {
        Self {
            transport,
            api_key,
            registry,
            listening: AtomicBool::new(false),
            span: info_span!("connector", endpoint = %endpoint),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    // ── Connection lifecycle ─────────────────────────────────────────────────

    /// Opens the connection.  A no-op when already connected.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::Connection`] if the socket cannot be opened.
    pub async fn connect(&self) -> Result<(), ConnectorError> {
        if self.transport.is_connected() {
            debug!(parent: &self.span, "connect called while already connected");
            return Ok(());
        }
        info!(parent: &self.span, "connecting to WebSocket");
        self.transport.connect().await?;
        info!(parent: &self.span, "connected to WebSocket");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Closes the connection.  A suspended [`Self::listen`] returns
    /// [`ConnectorError::ConnectionClosed`] promptly.
    pub async fn close(&self) {
        self.transport.close().await;
        info!(parent: &self.span, "connection closed");
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Requests a one-off snapshot of `modules`.
    pub async fn get_data<S: AsRef<str>>(&self, modules: &[S]) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        let modules = owned(modules);
        info!(parent: &self.span, ?modules, "getting data from server");
        self.send_command(Command::GetData { modules }).await
    }

    /// Subscribes to push updates for `modules`.
    pub async fn register_data_listener<S: AsRef<str>>(
        &self,
        modules: &[S],
    ) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        let modules = owned(modules);
        info!(parent: &self.span, ?modules, "registering data listener");
        self.send_command(Command::RegisterDataListener { modules }).await
    }

    pub async fn get_directories(&self) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, "getting directories");
        self.send_command(Command::GetDirectories).await
    }

    /// Lists files under media `base`, optionally inside relative `path`.
    pub async fn get_files(&self, base: &str, path: Option<&str>) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, base, path, "getting files");
        self.send_command(Command::GetFiles {
            base: base.to_owned(),
            path: path.map(str::to_owned),
        })
        .await
    }

    pub async fn get_file(&self, base: &str, path: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, base, path, "getting file");
        self.send_command(Command::GetFile {
            base: base.to_owned(),
            path: path.to_owned(),
        })
        .await
    }

    pub async fn press_key(&self, key: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, key, "pressing key");
        self.send_command(Command::KeyboardKeypress { key: key.to_owned() })
            .await
    }

    pub async fn enter_text(&self, text: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, chars = text.chars().count(), "entering text");
        self.send_command(Command::KeyboardText { text: text.to_owned() })
            .await
    }

    pub async fn open_path(&self, path: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, path, "opening path");
        self.send_command(Command::Open(OpenTarget::Path(path.to_owned())))
            .await
    }

    pub async fn open_url(&self, url: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, url, "opening URL");
        self.send_command(Command::Open(OpenTarget::Url(url.to_owned())))
            .await
    }

    /// Asks the backend process to exit.
    pub async fn exit_backend(&self) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        info!(parent: &self.span, "exiting backend");
        self.send_command(Command::ExitApplication).await
    }

    // ── Receiving ────────────────────────────────────────────────────────────

    /// Receives one raw envelope.
    ///
    /// An `error` frame with subtype `bad-api-key` is turned into
    /// [`ConnectorError::AuthenticationFailed`] here, before any dispatch.
    ///
    /// # Errors
    ///
    /// Whatever [`Transport::receive`] reports (frames queued before a peer
    /// close are still delivered first), plus `AuthenticationFailed`.
    pub async fn receive_message(&self) -> Result<InboundEnvelope, ConnectorError> {
        let envelope = self.transport.receive().await?;
        if let Notification::Error {
            subtype: Some(kind),
            message,
        } = &envelope.notification
        {
            if kind == subtype::BAD_API_KEY {
                warn!(parent: &self.span, "backend rejected the API key");
                return Err(ConnectorError::AuthenticationFailed(
                    message.clone().unwrap_or_default(),
                ));
            }
        }
        Ok(envelope)
    }

    /// Receives until one dispatchable module event arrives and returns it.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::ListenerBusy`] if another receive loop is running,
    /// otherwise the first error from [`Self::receive_message`].
    pub async fn next_event(&self) -> Result<(Module, ModulePayload), ConnectorError> {
        let _guard = ListenGuard::acquire(&self.listening)?;
        self.next_dispatchable().await
    }

    /// Runs the receive loop, invoking `on_event` for every module event in
    /// wire order.
    ///
    /// Returns only when receiving fails; the error is passed through.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_event`].
    pub async fn listen<F, Fut>(&self, mut on_event: F) -> Result<Infallible, ConnectorError>
    where
        F: FnMut(Module, ModulePayload) -> Fut,
        Fut: Future<Output = ()>,
    {
        let _guard = ListenGuard::acquire(&self.listening)?;
        info!(parent: &self.span, "listening for messages");
        loop {
            let (module, payload) = self.next_dispatchable().await?;
            on_event(module, payload).await;
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn ensure_connected(&self) -> Result<(), ConnectorError> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            Err(ConnectorError::not_connected())
        }
    }

    async fn send_command(&self, command: Command) -> Result<(), ConnectorError> {
        let id = Uuid::new_v4().to_string();
        let text = encode_command(&command, self.api_key.expose(), Some(&id));
        debug!(parent: &self.span, event = %command.kind(), %id, "sending command");
        self.transport.send(text).await
    }

    async fn next_dispatchable(&self) -> Result<(Module, ModulePayload), ConnectorError> {
        loop {
            let envelope = self.receive_message().await?;
            if let Some(event) = self.dispatch(envelope) {
                return Ok(event);
            }
        }
    }

    /// Maps one envelope to a module event, or `None` when it is only logged.
    fn dispatch(&self, envelope: InboundEnvelope) -> Option<(Module, ModulePayload)> {
        let (name, data) = match envelope.notification {
            Notification::Error {
                subtype: kind,
                message,
            } => {
                if kind.as_deref() == Some(subtype::LISTENER_ALREADY_REGISTERED) {
                    debug!(parent: &self.span, ?message, "listener already registered");
                } else {
                    warn!(parent: &self.span, subtype = ?kind, ?message, "error message from server");
                }
                return None;
            }
            Notification::DataUpdate { module, data: None } => {
                debug!(parent: &self.span, ?module, "data update without data");
                return None;
            }
            Notification::DataUpdate {
                module,
                data: Some(data),
            } => {
                let name = module.unwrap_or_default();
                debug!(parent: &self.span, module = %name, "new data");
                (name, data)
            }
            Notification::Directories(data) => (Module::MediaDirectories.name().to_owned(), data),
            Notification::Files(data) => (Module::MediaFiles.name().to_owned(), data),
            Notification::File(data) => (Module::MediaFile.name().to_owned(), data),
            Notification::Other { kind } => {
                debug!(parent: &self.span, %kind, "ignoring message");
                return None;
            }
        };

        let Some(module) = self.registry.resolve(&name) else {
            warn!(parent: &self.span, module = %name, "unknown model");
            return None;
        };

        match module.decode(data) {
            Ok(payload) => Some((module, payload)),
            Err(err) => {
                warn!(parent: &self.span, %module, error = %err, "dropping payload");
                None
            }
        }
    }
}

fn owned<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_owned()).collect()
}

/// Marks a receive loop as running for as long as it lives.
struct ListenGuard<'a>(&'a AtomicBool);

impl<'a> ListenGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ConnectorError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ConnectorError::ListenerBusy)
    }
}

impl Drop for ListenGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
