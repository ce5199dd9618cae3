//! settingsgen command-line interface.
//!
//! The binary is a thin wrapper: [`cli`] holds the clap definition and
//! [`commands`] the implementations, which return their output as text so
//! they can be exercised directly from tests.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
