//! `tqa` command line: clap arguments, one module per command, and the
//! human renderers for reports and validation results

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
