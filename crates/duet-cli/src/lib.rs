//! duet CLI library: argument definitions, commands, logging and terminal UI.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
