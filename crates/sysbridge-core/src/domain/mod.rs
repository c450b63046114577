//! Domain policy for the System Bridge connector.
//!
//! Code in this module is pure.  It decides how long to wait before retrying
//! and where config files live; sleeping and file access belong to the
//! crates that own the runtime.

/// Reconnect / relaunch delay policy.
pub mod backoff;

/// Platform location of the configuration files.
pub mod config_dir;
