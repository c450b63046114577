//! The closed set of event kinds understood by the System Bridge API.
//!
//! Outbound frames name their kind in the `event` field, inbound frames in the
//! `type` field.  Both use the same kebab-case spelling, so a single table
//! covers both directions.

use std::fmt;

/// Which side of the connection originates frames of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client → backend (`event` discriminator).
    Outbound,
    /// Backend → client (`type` discriminator).
    Inbound,
}

/// Every event kind defined by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // Outbound
    GetData,
    RegisterDataListener,
    GetDirectories,
    GetFiles,
    GetFile,
    KeyboardKeypress,
    KeyboardText,
    Open,
    ExitApplication,
    // Inbound
    DataUpdate,
    Error,
    Directories,
    Files,
    File,
}

// ── Wire names ────────────────────────────────────────────────────────────────

const WIRE_NAMES: [(EventKind, &str); 14] = [
    (EventKind::GetData, "get-data"),
    (EventKind::RegisterDataListener, "register-data-listener"),
    (EventKind::GetDirectories, "get-directories"),
    (EventKind::GetFiles, "get-files"),
    (EventKind::GetFile, "get-file"),
    (EventKind::KeyboardKeypress, "keyboard-keypress"),
    (EventKind::KeyboardText, "keyboard-text"),
    (EventKind::Open, "open"),
    (EventKind::ExitApplication, "exit-application"),
    (EventKind::DataUpdate, "data-update"),
    (EventKind::Error, "error"),
    (EventKind::Directories, "directories"),
    (EventKind::Files, "files"),
    (EventKind::File, "file"),
];

impl EventKind {
    /// Returns the kebab-case name used on the wire.
    pub fn as_str(self) -> &'static str {
        // WIRE_NAMES is declared in variant order.
        WIRE_NAMES[self as usize].1
    }

    /// Looks up a kind by its wire name.  Returns `None` for names outside the
    /// closed set; callers decide whether that is an error.
    pub fn from_wire(name: &str) -> Option<Self> {
        WIRE_NAMES
            .iter()
            .find(|(_, wire)| *wire == name)
            .map(|(kind, _)| *kind)
    }

    pub fn direction(self) -> Direction {
        match self {
            EventKind::DataUpdate
            | EventKind::Error
            | EventKind::Directories
            | EventKind::Files
            | EventKind::File => Direction::Inbound,
            _ => Direction::Outbound,
        }
    }

    /// Iterates over every kind in declaration order.
    pub fn all() -> impl Iterator<Item = EventKind> {
        WIRE_NAMES.iter().map(|(kind, _)| *kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_unique_wire_name() {
        let mut names: Vec<&str> = EventKind::all().map(EventKind::as_str).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();

        assert_eq!(total, 14);
        assert_eq!(names.len(), total, "wire names must not collide");
    }

    #[test]
    fn test_wire_table_is_in_declaration_order() {
        for (index, (kind, _)) in WIRE_NAMES.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?} is out of place");
        }
    }

    #[test]
    fn test_from_wire_inverts_as_str() {
        for kind in EventKind::all() {
            assert_eq!(EventKind::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_from_wire_rejects_unknown_and_differently_cased_names() {
        assert_eq!(EventKind::from_wire("get_data"), None);
        assert_eq!(EventKind::from_wire("GET-DATA"), None);
        assert_eq!(EventKind::from_wire(""), None);
    }

    #[test]
    fn test_direction_splits_nine_outbound_and_five_inbound() {
        let outbound = EventKind::all()
            .filter(|k| k.direction() == Direction::Outbound)
            .count();
        let inbound = EventKind::all()
            .filter(|k| k.direction() == Direction::Inbound)
            .count();

        assert_eq!(outbound, 9);
        assert_eq!(inbound, 5);
    }

    #[test]
    fn test_display_uses_wire_name() {
        assert_eq!(EventKind::RegisterDataListener.to_string(), "register-data-listener");
        assert_eq!(EventKind::ExitApplication.to_string(), "exit-application");
    }
}
