//! Typed representations of every frame exchanged with the backend.
//!
//! Outbound frames are [`Command`]s, inbound frames are [`Notification`]s
//! wrapped in an [`InboundEnvelope`].  Both are closed enums; the codec in
//! [`super::codec`] is the only place that knows the JSON field names.

use serde_json::Value;

use crate::protocol::event::EventKind;

// ── Field names ───────────────────────────────────────────────────────────────

/// JSON keys used in envelopes.
pub mod field {
    pub const EVENT: &str = "event";
    pub const TYPE: &str = "type";
    pub const API_KEY: &str = "api-key";
    pub const ID: &str = "id";
    pub const MODULES: &str = "modules";
    pub const MODULE: &str = "module";
    pub const BASE: &str = "base";
    pub const PATH: &str = "path";
    pub const KEY: &str = "key";
    pub const TEXT: &str = "text";
    pub const URL: &str = "url";
    pub const SUBTYPE: &str = "subtype";
    pub const MESSAGE: &str = "message";
    pub const DATA: &str = "data";
    pub const DIRECTORIES: &str = "directories";
    pub const FILES: &str = "files";
    pub const FILE: &str = "file";
}

/// Well-known values of the `subtype` field on `error` frames.
pub mod subtype {
    /// The API key was rejected.  Fatal for the session.
    pub const BAD_API_KEY: &str = "bad-api-key";
    /// A data listener was already registered on this connection.  Benign.
    pub const LISTENER_ALREADY_REGISTERED: &str = "listener-already-registered";
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// What an `open` command asks the backend to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    Path(String),
    Url(String),
}

/// A client → backend command.  One variant per outbound [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request a one-off snapshot of the named modules.
    GetData { modules: Vec<String> },
    /// Subscribe to push updates for the named modules.
    RegisterDataListener { modules: Vec<String> },
    GetDirectories,
    /// List files under a media base, optionally inside a relative `path`.
    GetFiles { base: String, path: Option<String> },
    GetFile { base: String, path: String },
    KeyboardKeypress { key: String },
    KeyboardText { text: String },
    Open(OpenTarget),
    /// Ask the backend process to exit.
    ExitApplication,
}

impl Command {
    pub fn kind(&self) -> EventKind {
        match self {
            Command::GetData { .. } => EventKind::GetData,
            Command::RegisterDataListener { .. } => EventKind::RegisterDataListener,
            Command::GetDirectories => EventKind::GetDirectories,
            Command::GetFiles { .. } => EventKind::GetFiles,
            Command::GetFile { .. } => EventKind::GetFile,
            Command::KeyboardKeypress { .. } => EventKind::KeyboardKeypress,
            Command::KeyboardText { .. } => EventKind::KeyboardText,
            Command::Open(_) => EventKind::Open,
            Command::ExitApplication => EventKind::ExitApplication,
        }
    }
}

/// A decoded outbound frame, including the credentials it was sent with.
///
/// Only the backend side (or a test double playing it) needs this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub api_key: String,
    pub id: Option<String>,
    pub command: Command,
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// A backend → client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// New data for a module.  `data` is `None` when the field was absent or
    /// JSON `null`.
    DataUpdate {
        module: Option<String>,
        data: Option<Value>,
    },
    /// The backend reported a problem with a previous request.
    Error {
        subtype: Option<String>,
        message: Option<String>,
    },
    /// Reply to `get-directories`; the nested `directories` object.
    Directories(Value),
    /// Reply to `get-files`; the nested `files` object.
    Files(Value),
    /// Reply to `get-file`; the nested `file` object.
    File(Value),
    /// Any `type` this client does not act on.  Kept so newer backends do not
    /// break older clients.
    Other { kind: String },
}

impl Notification {
    /// The wire kind, or `None` for [`Notification::Other`] frames whose type
    /// is outside the known set.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Notification::DataUpdate { .. } => Some(EventKind::DataUpdate),
            Notification::Error { .. } => Some(EventKind::Error),
            Notification::Directories(_) => Some(EventKind::Directories),
            Notification::Files(_) => Some(EventKind::Files),
            Notification::File(_) => Some(EventKind::File),
            Notification::Other { kind } => EventKind::from_wire(kind),
        }
    }

    /// Returns the type string as it appeared on the wire.
    pub fn type_name(&self) -> &str {
        match self {
            Notification::Other { kind } => kind,
            _ => self.kind().map(EventKind::as_str).unwrap_or_default(),
        }
    }
}

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEnvelope {
    /// Correlation id echoed back by the backend, when present.
    pub id: Option<String>,
    pub notification: Notification,
}

impl InboundEnvelope {
    pub fn new(notification: Notification) -> Self {
        Self {
            id: None,
            notification,
        }
    }
}
