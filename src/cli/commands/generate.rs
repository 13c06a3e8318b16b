//! `tqa generate` command - the full pipeline
//!
//! Recommends a tool (or takes `--tool`), extracts the record it needs with
//! the AI stage first and text patterns as fallback, gates it, and runs the
//! engine. `--ai-response` stands in for the AI collaborator with a saved
//! response; without it the AI stage is unavailable.

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{build_context, load_history, print_structured, resolve_format};
use crate::cli::output::{print_tool_report, print_validation};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::extract::ExtractionRequest;
use crate::tools::ToolId;

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// What you want to generate
    pub query: String,

    /// Tool to generate, skipping recommendation
    #[arg(long, short = 't')]
    pub tool: Option<ToolId>,

    /// Text holding the data, if separate from the query
    #[arg(long, short = 'e')]
    pub evidence: Option<String>,

    /// Conversation history (JSON array of {role, content})
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Saved AI-extraction response to use as the AI stage
    #[arg(long)]
    pub ai_response: Option<PathBuf>,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);
    let history = match &args.history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };
    let context = build_context(config, args.ai_response.as_deref())?;

    let mut request = ExtractionRequest::new(&args.query).with_history(&history);
    if let Some(evidence) = &args.evidence {
        request = request.with_evidence(evidence);
    }

    let generated = context.generate(&request, args.tool)?;
    if print_structured(&generated, format)? {
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{} Generated {} from {} extraction",
            style("✓").green(),
            style(generated.tool.spec().name).cyan(),
            generated.extraction_stage
        );
        println!("   {} {}", style("Evidence:").dim(), generated.evidence_text);
        print_validation(&generated.validation);
        println!();
    }
    print_tool_report(&generated.report);

    Ok(())
}
