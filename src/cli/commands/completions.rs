//! `tqa completions` command - print a shell completion script for `tqa`

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cli = Cli::command();
    let name = cli.get_name().to_string();
    generate(args.shell, &mut cli, name, &mut io::stdout());
    Ok(())
}
