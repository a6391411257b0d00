//! Async runtime glue.
//!
//! The game itself is synchronous; this module drives it from tokio.

pub mod driver;

pub use driver::{Command, DriverError, DriverHandle, GameDriver};
