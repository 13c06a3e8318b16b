//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{AssistantContext, Config};
use crate::extract::{CannedResponse, ChatMessage};

/// Resolve `auto` against the configured default format
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    match global.format {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Auto),
        f => f,
    }
}

/// Print `value` as YAML or JSON; returns false for human output
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Auto => Ok(false),
    }
}

/// Load a conversation history file (a JSON array of `{role, content}`)
pub fn load_history(path: &Path) -> Result<Vec<ChatMessage>> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid history file {}", path.display()))
}

/// Context from the effective configuration, with a file-backed AI response if given
pub fn build_context(config: Config, ai_response: Option<&Path>) -> Result<AssistantContext> {
    let context = AssistantContext::new(config);
    match ai_response {
        Some(path) => {
            let ai = CannedResponse::from_file(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read AI response {}", path.display()))?;
            Ok(context.with_ai(Arc::new(ai)))
        }
        None => Ok(context),
    }
}

/// Format an optional number, "n/a" when absent
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
