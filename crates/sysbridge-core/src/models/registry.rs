//! Model registry: maps a module name to its typed decoding schema.
//!
//! The set of modules is closed and known at compile time, so the registry is
//! a [`Module`] enum plus a table of which modules a given client accepts.
//! Lookups of names outside the table return `None`; the caller logs and
//! moves on rather than failing.

use serde::Serialize;
use serde_json::Value;

use crate::models::battery::Battery;
use crate::models::display::Display;
use crate::models::media::{MediaDirectories, MediaFile, MediaFiles};
use crate::protocol::codec::CodecError;

/// Every module name the client can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    Battery,
    Display,
    /// Pseudo-module for `directories` replies.
    MediaDirectories,
    /// Pseudo-module for `files` replies.
    MediaFiles,
    /// Pseudo-module for `file` replies.
    MediaFile,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::Battery,
        Module::Display,
        Module::MediaDirectories,
        Module::MediaFiles,
        Module::MediaFile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Module::Battery => "battery",
            Module::Display => "display",
            Module::MediaDirectories => "media-directories",
            Module::MediaFiles => "media-files",
            Module::MediaFile => "media-file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Module::ALL.into_iter().find(|m| m.name() == name)
    }

    /// `true` for modules the backend pushes through `data-update`, as
    /// opposed to the media pseudo-modules that only answer requests.
    pub fn is_data_module(self) -> bool {
        matches!(self, Module::Battery | Module::Display)
    }

    /// Decodes `data` with this module's schema.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::PayloadMismatch`] if `data` does not fit.
    pub fn decode(self, data: Value) -> Result<ModulePayload, CodecError> {
        let mismatch = |err: serde_json::Error| CodecError::PayloadMismatch {
            module: self.name(),
            reason: err.to_string(),
        };
        Ok(match self {
            Module::Battery => ModulePayload::Battery(serde_json::from_value(data).map_err(mismatch)?),
            Module::Display => ModulePayload::Display(serde_json::from_value(data).map_err(mismatch)?),
            Module::MediaDirectories => {
                ModulePayload::MediaDirectories(serde_json::from_value(data).map_err(mismatch)?)
            }
            Module::MediaFiles => {
                ModulePayload::MediaFiles(serde_json::from_value(data).map_err(mismatch)?)
            }
            Module::MediaFile => ModulePayload::MediaFile(serde_json::from_value(data).map_err(mismatch)?),
        })
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded module payload, handed to the listener callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModulePayload {
    Battery(Battery),
    Display(Display),
    MediaDirectories(MediaDirectories),
    MediaFiles(MediaFiles),
    MediaFile(MediaFile),
}

impl ModulePayload {
    pub fn module(&self) -> Module {
        match self {
            ModulePayload::Battery(_) => Module::Battery,
            ModulePayload::Display(_) => Module::Display,
            ModulePayload::MediaDirectories(_) => Module::MediaDirectories,
            ModulePayload::MediaFiles(_) => Module::MediaFiles,
            ModulePayload::MediaFile(_) => Module::MediaFile,
        }
    }

    pub fn as_battery(&self) -> Option<&Battery> {
        match self {
            ModulePayload::Battery(battery) => Some(battery),
            _ => None,
        }
    }

    pub fn as_display(&self) -> Option<&Display> {
        match self {
            ModulePayload::Display(display) => Some(display),
            _ => None,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The table of modules a client will decode.  Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry {
    modules: Vec<Module>,
}

impl ModelRegistry {
    /// A registry containing every known module.
    pub fn standard() -> Self {
        Self {
            modules: Module::ALL.to_vec(),
        }
    }

    /// A registry restricted to `modules`.  Duplicates are ignored.
    pub fn with_modules(modules: &[Module]) -> Self {
        let mut table = Vec::with_capacity(modules.len());
        for module in modules {
            if !table.contains(module) {
                table.push(*module);
            }
        }
        Self { modules: table }
    }

    /// Returns the module registered under `name`, or `None`.
    pub fn resolve(&self, name: &str) -> Option<Module> {
        Module::from_name(name).filter(|m| self.modules.contains(m))
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
