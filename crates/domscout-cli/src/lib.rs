//! Domscout CLI library
//!
//! Argument parsing, configuration loading and output rendering for the
//! `domscout` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, DiscoverArgs, FormatArg, TargetArgs};
pub use config::{apply_overrides, build_request, init_logging, load_config, load_cookies, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render, Reporter};
