//! # sysbridge-core
//!
//! Shared library for the System Bridge connector containing the JSON wire
//! codec, the closed set of event kinds, the typed data models pushed by the
//! backend, and the reconnect backoff policy.
//!
//! This crate is used by both the connector (protocol client + CLI) and the
//! launcher.  It has zero dependencies on sockets, processes, or the async
//! runtime, so everything in here can be unit-tested synchronously.
//!
//! # Architecture overview (for beginners)
//!
//! System Bridge is a desktop telemetry/control bridge: a backend process
//! collects machine metrics (battery, displays, ...) and exposes them over a
//! local WebSocket API.  Clients connect, authenticate with a pre-shared API
//! key, subscribe to data modules, and receive push updates.  They can also
//! ask the backend to do things: open a URL, press a key, exit.
//!
//! This crate (`sysbridge-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How messages travel over the socket.  Every frame is a
//!   single JSON object.  Outbound frames carry an `event` discriminator and
//!   the `api-key`; inbound frames carry a `type` discriminator.  The codec
//!   turns these into closed Rust enums ([`Command`], [`Notification`]).
//!
//! - **`models`** – The typed payloads (battery, display, media listings) and
//!   the [`ModelRegistry`] that maps a module name to its decoding schema.
//!
//! - **`domain`** – Pure policy with no I/O: the exponential backoff used
//!   when reconnecting to, or relaunching, the backend, and the platform
//!   location of the configuration files.

pub mod domain;
pub mod models;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `sysbridge_core::Command` instead of `sysbridge_core::protocol::messages::Command`.
pub use domain::backoff::ExponentialBackoff;
pub use models::registry::{ModelRegistry, Module, ModulePayload};
pub use protocol::codec::{decode_command, decode_inbound, encode_command, encode_inbound, CodecError};
pub use protocol::event::EventKind;
pub use protocol::messages::{Command, InboundEnvelope, Notification};
