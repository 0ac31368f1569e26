//! Library half of the `ve-fields` binary: argument definitions and command
//! handlers.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, OutputFormat};
