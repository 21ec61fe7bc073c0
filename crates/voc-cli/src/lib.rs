//! Voc CLI library.
//!
//! Wires collection, analysis, storage and reporting into the `voc`
//! command-line tool, including configuration loading and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
