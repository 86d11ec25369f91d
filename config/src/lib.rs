//! Configuration for the swap binary
//!
//! Options are read from the command line, optionally prefixed by the
//! contents of a TOML config file; command line values take precedence over
//! file values.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod cli;
pub mod parsing;
pub mod validation;

pub use cli::{Cli, SwapCommand, SwapConfig};
pub use parsing::parse_command_line_args;
