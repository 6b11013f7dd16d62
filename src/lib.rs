//! dcli - interactive Discord channel client
//!
//! This library provides the session state, saved-channel registry,
//! config persistence and command dispatcher behind the `dcli` binary.

pub mod api;
pub mod bootstrap;
pub mod channels;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
