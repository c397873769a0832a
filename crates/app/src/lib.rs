//! Keydesk - command-line client
//!
//! Parses arguments, resolves settings and drives a client session against
//! the REST service.

pub mod cli;
pub mod commands;
mod confirm;
mod error;
pub mod logging;
mod output;

pub use cli::Cli;
pub use commands::{Context, execute, run};
pub use confirm::TerminalConfirmer;
pub use error::CliError;
