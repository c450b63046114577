//! sysbridge-launcher library entry point.
//!
//! Starts the System Bridge backend (and any other configured programs) and
//! keeps them alive, restarting each one with exponential backoff when it
//! exits with a failure.
//!
//! Re-exports all public modules so that the binary entry point in `main.rs`
//! and the tests share the same module tree.

pub mod application;
pub mod infrastructure;
