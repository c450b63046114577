//! Typed payloads pushed by the backend, and the registry that maps module
//! names onto them.

pub mod battery;
pub mod display;
pub mod media;
pub mod registry;

pub use battery::{Battery, BatteryLastUpdated};
pub use display::{Display, DisplayLastUpdated};
pub use media::{MediaBase, MediaDirectories, MediaDirectory, MediaFile, MediaFiles, UnknownMediaBase};
pub use registry::{ModelRegistry, Module, ModulePayload};
