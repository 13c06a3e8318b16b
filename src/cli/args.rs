//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, config::ConfigCommands,
    extract::ExtractArgs, generate::GenerateArgs, recommend::RecommendArgs,
};

#[derive(Parser)]
#[command(name = "tqa")]
#[command(author, version, about = "Tessera Quality Assistant")]
#[command(long_about = "Turns free-form quality statements into SPC artifacts: Pareto breakdowns, control charts, capability indices, distribution statistics, and fishbone cause breakdowns.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract structured quality data from text
    Extract(ExtractArgs),

    /// Run one quality tool on data found in text
    Analyze(AnalyzeArgs),

    /// Recommend a quality tool and check whether the data supports it
    Recommend(RecommendArgs),

    /// Full pipeline: recommend, extract, validate, and generate
    Generate(GenerateArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text, or the configured default when set
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "text" => Ok(OutputFormat::Auto),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Use auto, yaml, or json", s)),
        }
    }
}
