//! `tqa config` command - Configuration inspection

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, resolve_format};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show paths to configuration files
    Path,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    if print_structured(&config, resolve_format(global, &config))? {
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    print_config_value("similarity_threshold", Some(config.similarity_threshold.to_string()));
    print_config_value("subgroup_size", Some(config.subgroup_size.to_string()));
    print_config_value("history_window", Some(config.history_window.to_string()));
    print_config_value("min_evidence_numbers", Some(config.min_evidence_numbers.to_string()));
    print_config_value("default_format", config.default_format.clone());

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (TQA_SIMILARITY_THRESHOLD, TQA_SUBGROUP_SIZE, TQA_HISTORY_WINDOW)");
    println!("  2. Local config (.tqa/config.yaml)");
    println!("  3. Global config (~/.config/tqa/config.yaml)");

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!(
            "  {} {}",
            style("Global:").cyan(),
            style("(no home directory)").dim()
        ),
    }

    if let Ok(dir) = std::env::current_dir() {
        println!();
        print_path("Local:", &Config::local_config_path(&dir));
    }

    Ok(())
}

fn print_path(label: &str, path: &std::path::Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn print_config_value(key: &str, value: Option<String>) {
    match value {
        Some(v) => println!("  {:<22} {}", style(key).cyan(), v),
        None => println!("  {:<22} {}", style(key).cyan(), style("(not set)").dim()),
    }
}
