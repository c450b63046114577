//! Application layer: the supervision loop.

pub mod supervise;

pub use supervise::{run_all, supervise, LaunchError};
