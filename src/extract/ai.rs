//! AI-extraction collaborator and payload decoding
//!
//! The collaborator returns raw response text. Decoding strips a markdown
//! code fence, parses the JSON object, and converts each non-null section
//! into a record tagged [`DataSource::AiExtraction`].

use miette::Diagnostic;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::diagnostics::AiPayloadError;
use crate::entities::{
    CauseEffectData, DataSource, DefectData, ExtractedData, ProcessData, QualityMetrics,
    Specifications,
};

/// Confidence assigned to cause-effect data decoded from an AI payload
pub const AI_CAUSE_CONFIDENCE: f64 = 0.8;

/// Failure of the AI-extraction collaborator itself
#[derive(Debug, Error, Diagnostic)]
pub enum AiError {
    #[error("AI extraction is not configured")]
    #[diagnostic(
        code(tqa::extract::ai_unavailable),
        help("Pass --ai-response with a saved model response, or rely on pattern extraction")
    )]
    Unavailable,

    #[error("AI extraction timed out after {0:?}")]
    #[diagnostic(code(tqa::extract::ai_timeout))]
    Timeout(Duration),

    #[error("AI extraction failed: {0}")]
    #[diagnostic(code(tqa::extract::ai_failed))]
    Failed(String),
}

/// Source of best-effort structured extraction.
///
/// `user_text` is the user's message, `context` the formatted conversation.
/// Implementations own their timeouts and report them as [`AiError::Timeout`].
pub trait AiExtractor: Send + Sync {
    fn extract(&self, user_text: &str, context: &str) -> Result<String, AiError>;
}

/// Collaborator used when no model is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAi;

impl AiExtractor for NoAi {
    fn extract(&self, _user_text: &str, _context: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable)
    }
}

/// Collaborator that replays a saved model response
#[derive(Debug, Clone)]
pub struct CannedResponse {
    response: String,
}

impl CannedResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// Load the response text from a file
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl AiExtractor for CannedResponse {
    fn extract(&self, _user_text: &str, _context: &str) -> Result<String, AiError> {
        Ok(self.response.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiPayload {
    defect_data: Option<RawDefect>,
    process_data: Option<RawProcess>,
    cause_effect_data: Option<RawCauseEffect>,
    quality_metrics: Option<Vec<RawMetric>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefect {
    categories: Option<Vec<String>>,
    counts: Option<Vec<f64>>,
    time_period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProcess {
    measurements: Option<Vec<f64>>,
    specifications: Option<Specifications>,
    process_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCauseEffect {
    problem: Option<String>,
    main_categories: Option<Vec<String>>,
    sub_causes: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetric {
    metric_name: Option<String>,
    value: Option<f64>,
    target: Option<f64>,
    threshold: Option<f64>,
    unit: Option<String>,
    trend: Option<String>,
}

/// Decode a raw collaborator response into extracted data
pub fn decode_payload(raw: &str) -> Result<ExtractedData, AiPayloadError> {
    let body = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AiPayloadError::from_serde_error(&e, body, "ai-response"))?;
    if !value.is_object() {
        return Err(AiPayloadError::not_an_object(body, "ai-response"));
    }

    let payload: AiPayload = serde_json::from_value(value)
        .map_err(|e| AiPayloadError::from_serde_error(&e, body, "ai-response"))?;

    Ok(payload.into_extracted())
}

/// Take the content of a ```json fence, else of a bare ``` fence, else the text
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let inner = if let Some((_, rest)) = trimmed.split_once("```json") {
        Some(rest)
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        Some(rest)
    } else {
        None
    };

    match inner {
        Some(rest) => rest.split("```").next().unwrap_or(rest).trim(),
        None => trimmed,
    }
}

impl AiPayload {
    fn into_extracted(self) -> ExtractedData {
        ExtractedData {
            defect_data: self.defect_data.and_then(RawDefect::into_record),
            process_data: self.process_data.and_then(RawProcess::into_record),
            cause_effect_data: self.cause_effect_data.and_then(RawCauseEffect::into_record),
            quality_metrics: self
                .quality_metrics
                .unwrap_or_default()
                .into_iter()
                .map(RawMetric::into_record)
                .collect(),
        }
    }
}

impl RawDefect {
    fn into_record(self) -> Option<DefectData> {
        let categories = self.categories.filter(|c| !c.is_empty())?;
        let counts: Vec<u64> = self
            .counts
            .filter(|c| !c.is_empty())?
            .into_iter()
            .map(|c| if c.is_finite() { c.max(0.0).round() as u64 } else { 0 })
            .collect();
        if DefectData::checked_total(&counts).is_none() {
            return None;
        }

        let data = DefectData::new(categories, counts, DataSource::AiExtraction);
        Some(match self.time_period {
            Some(period) => data.with_time_period(period),
            None => data,
        })
    }
}

impl RawProcess {
    fn into_record(self) -> Option<ProcessData> {
        let measurements = self.measurements.filter(|m| !m.is_empty())?;
        let data = ProcessData::new(
            measurements,
            self.specifications.unwrap_or_default(),
            DataSource::AiExtraction,
        );
        Some(match self.process_name {
            Some(name) => data.with_process_name(name),
            None => data,
        })
    }
}

impl RawCauseEffect {
    fn into_record(self) -> Option<CauseEffectData> {
        let problem = self.problem.filter(|p| !p.trim().is_empty());
        let categories = self.main_categories.unwrap_or_default();
        if problem.is_none() && categories.is_empty() {
            return None;
        }

        Some(CauseEffectData::new(
            problem.unwrap_or_default(),
            categories,
            self.sub_causes.unwrap_or_default(),
            AI_CAUSE_CONFIDENCE,
        ))
    }
}

impl RawMetric {
    fn into_record(self) -> QualityMetrics {
        let mut metric = QualityMetrics::new(
            self.metric_name.unwrap_or_else(|| "Unknown".to_string()),
            self.value.unwrap_or(0.0),
        );
        metric.target = self.target;
        metric.threshold = self.threshold;
        metric.unit = self.unit;
        metric.trend = self.trend.and_then(|t| t.parse().ok());
        metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"Here is the data:
```json
{
    "defect_data": {"categories": ["Scratch", "Dent"], "counts": [10, 5], "time_period": "March"},
    "process_data": {
        "measurements": [1.2, 1.3, 1.1],
        "specifications": {"usl": 1.5, "lsl": 1.0},
        "process_name": "Shaft OD"
    },
    "cause_effect_data": {
        "problem": "Shaft out of round",
        "main_categories": ["Machine", "Method"],
        "sub_causes": {"Machine": ["Chuck wear"]}
    },
    "quality_metrics": [{"metric_name": "Cpk", "value": 0.9, "trend": "decreasing"}]
}
```"#;

    #[test]
    fn test_decode_full_payload() {
        let data = decode_payload(FULL_RESPONSE).unwrap();

        let defects = data.defect_data.unwrap();
        assert_eq!(defects.categories(), &["Scratch", "Dent"]);
        assert_eq!(defects.counts(), &[10, 5]);
        assert_eq!(defects.time_period(), Some("March"));
        assert_eq!(defects.source(), DataSource::AiExtraction);

        let process = data.process_data.unwrap();
        assert_eq!(process.sample_size(), 3);
        assert_eq!(process.specifications().limits(), Some((1.5, 1.0)));
        assert_eq!(process.process_name(), Some("Shaft OD"));

        let causes = data.cause_effect_data.unwrap();
        assert_eq!(causes.confidence(), AI_CAUSE_CONFIDENCE);
        assert_eq!(causes.causes_for("Machine"), &["Chuck wear"]);

        assert_eq!(data.quality_metrics.len(), 1);
        assert_eq!(data.quality_metrics[0].trend, Some(crate::entities::Trend::Decreasing));
    }

    #[test]
    fn test_all_null_payload_is_empty() {
        let data = decode_payload(
            r#"{"defect_data": null, "process_data": null, "cause_effect_data": null, "quality_metrics": null}"#,
        )
        .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_incomplete_sections_are_dropped() {
        let data = decode_payload(
            r#"{"defect_data": {"categories": ["Scratch"], "counts": null},
                "process_data": {"measurements": []},
                "cause_effect_data": {"problem": "", "main_categories": []}}"#,
        )
        .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(decode_payload("I could not find any data.").is_err());
        assert!(decode_payload("```json\n{\"defect_data\": {\n```").is_err());
        assert!(decode_payload("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_overflowing_counts_drop_the_defect_section() {
        let data = decode_payload(
            r#"{"defect_data": {"categories": ["a", "b"], "counts": [1e19, 1e19]}}"#,
        )
        .unwrap();
        assert!(data.defect_data.is_none());
        assert!(data.is_empty());

        let data = decode_payload(
            r#"{"defect_data": {"categories": ["a", "b"], "counts": [1e30, 1]},
                "process_data": {"measurements": [2.0, 3.0]}}"#,
        )
        .unwrap();
        assert!(data.defect_data.is_none());
        assert!(data.process_data.is_some());
    }

    #[test]
    fn test_bare_fence_is_stripped() {
        let data = decode_payload("```\n{\"process_data\": {\"measurements\": [2.0, 3.0]}}\n```").unwrap();
        assert_eq!(data.process_data.unwrap().measurements(), &[2.0, 3.0]);
    }

    #[test]
    fn test_collaborators() {
        assert!(matches!(NoAi.extract("q", ""), Err(AiError::Unavailable)));
        let canned = CannedResponse::new("{}");
        assert_eq!(canned.extract("q", "").unwrap(), "{}");
    }
}
