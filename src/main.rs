use clap::Parser;
use miette::Result;
use tqa::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Extract(args) => tqa::cli::commands::extract::run(args, &global),
        Commands::Analyze(args) => tqa::cli::commands::analyze::run(args, &global),
        Commands::Recommend(args) => tqa::cli::commands::recommend::run(args, &global),
        Commands::Generate(args) => tqa::cli::commands::generate::run(args, &global),
        Commands::Config(cmd) => tqa::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => tqa::cli::commands::completions::run(args),
    }
}

/// Logs go to stderr; RUST_LOG wins over -v/-q
fn init_logging(global: &GlobalOpts) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
