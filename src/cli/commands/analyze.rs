//! `tqa analyze` command - run one quality tool on text

use console::style;
use miette::Result;
use serde::Serialize;

use crate::analysis::ControlMode;
use crate::cli::helpers::{build_context, print_structured, resolve_format};
use crate::cli::output::{print_tool_report, print_validation};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::extract::ExtractionRequest;
use crate::tools::{generate, GeneratorOptions, ToolId, ToolReport};
use crate::validation::ValidationReport;

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Tool to run (pareto, fishbone, control, histogram, capability)
    pub tool: ToolId,

    /// Text holding the data
    pub text: String,

    /// Subgroup size for X-bar/R charts (default from config)
    #[arg(long)]
    pub subgroup_size: Option<usize>,

    /// Build an Individuals/MR chart instead of X-bar/R
    #[arg(long)]
    pub individuals: bool,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    #[serde(flatten)]
    report: ToolReport,
    validation: ValidationReport,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);
    let options = GeneratorOptions {
        subgroup_size: args.subgroup_size.unwrap_or(config.subgroup_size),
        control_mode: if args.individuals {
            ControlMode::Individuals
        } else {
            ControlMode::XbarR
        },
    };

    let context = build_context(config, None)?;
    let prepared = context.prepare(args.tool, &ExtractionRequest::new(&args.text))?;
    let report = generate(args.tool, &prepared.record, &options)?;

    let output = AnalyzeOutput {
        report,
        validation: prepared.validation,
    };
    if print_structured(&output, format)? {
        return Ok(());
    }

    if !global.quiet && !output.validation.warnings.is_empty() {
        println!("{}", style("Validation").dim());
        print_validation(&output.validation);
        println!();
    }
    print_tool_report(&output.report);

    Ok(())
}
