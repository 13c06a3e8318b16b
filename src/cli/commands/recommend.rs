//! `tqa recommend` command - tool recommendation and generation check

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{build_context, print_structured, resolve_format};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::entities::ExtractedData;
use crate::tools::{data_collection_questions, GenerationCheck, MatchMethod};

#[derive(clap::Args, Debug)]
pub struct RecommendArgs {
    /// What you want to do
    pub query: String,

    /// Text holding the data, if separate from the query
    #[arg(long, short = 'e')]
    pub evidence: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecommendOutput {
    matched: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    check: Option<GenerationCheck>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    questions: Vec<String>,
}

pub fn run(args: RecommendArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);
    let context = build_context(config, None)?;

    let check = context.check_generation(&args.query, args.evidence.as_deref())?;
    let questions = match &check {
        Some(check) if !check.data_sufficient => {
            let extracted = check
                .extracted
                .clone()
                .map(ExtractedData::from)
                .unwrap_or_default();
            data_collection_questions(check.tool_match.tool, &extracted)
        }
        _ => Vec::new(),
    };

    let output = RecommendOutput {
        matched: check.is_some(),
        check,
        questions,
    };
    if print_structured(&output, format)? {
        return Ok(());
    }

    let Some(check) = &output.check else {
        println!(
            "{} No quality tool matched the request (threshold {:.2})",
            style("ℹ").blue(),
            context.config().similarity_threshold
        );
        return Ok(());
    };

    println!("{}", check.suggestion());
    if !global.quiet {
        println!();
        let matched = match check.tool_match.matched_by {
            MatchMethod::Similarity => "matched",
            MatchMethod::Keyword => "named by keyword",
        };
        println!(
            "   {} {} ({:.1}%, {} \"{}\")",
            style("Tool:").dim(),
            style(check.tool_match.tool).cyan(),
            check.tool_match.confidence * 100.0,
            matched,
            check.tool_match.matched_phrase
        );
        println!(
            "   {} {} of {} {} required",
            style("Data:").dim(),
            check.extracted_points,
            check.min_data_points,
            check.tool_match.tool.spec().point_unit()
        );
    }
    if !output.questions.is_empty() {
        println!();
        for question in &output.questions {
            println!("   {} {}", style("?").yellow(), question);
        }
    }

    Ok(())
}
