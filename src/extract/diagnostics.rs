//! AI payload decode errors with source locations

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// The AI collaborator's response could not be decoded as a payload
#[derive(Debug, Error, Diagnostic)]
#[error("AI payload is not valid JSON: {message}")]
#[diagnostic(code(tqa::extract::ai_payload))]
pub struct AiPayloadError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl AiPayloadError {
    /// Create a payload error from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, name: &str) -> Self {
        let offset = line_col_to_offset(source, err.line().max(1), err.column().max(1));
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    /// A payload that parsed but is not a JSON object
    pub fn not_an_object(source: &str, name: &str) -> Self {
        Self {
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from(0..source.len().min(1)),
            help: Some("The response must be a single JSON object with data keys".to_string()),
            message: "expected a JSON object".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return (line_start + column.saturating_sub(1)).min(source.len());
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

/// Suggest a fix for common model output mistakes
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("trailing comma") {
        return Some("Remove the comma after the last item of the list or object".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some("The response was cut off; the JSON object is not closed".to_string());
    }

    if msg_lower.contains("key must be a string") {
        return Some("Object keys must be double-quoted: {\"defect_data\": ...}".to_string());
    }

    if msg_lower.contains("expected value") {
        return Some(
            "The response contains text that is not JSON; only the JSON object is expected"
                .to_string(),
        );
    }

    if msg_lower.contains("invalid type") {
        return Some("A field has the wrong type, e.g. a number given as a string".to_string());
    }

    None
}
