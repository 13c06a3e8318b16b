//! Extraction orchestrator
//!
//! Stage one asks the AI collaborator and returns `Ok(data)` or the reason it
//! could not. Stage two, the pattern extractor, only runs on that `Err`. The
//! query (what the user wants) and the evidence text (where the numbers are)
//! are kept apart throughout.

use serde::Serialize;
use tracing::{debug, warn};

use super::ai::{decode_payload, AiError, AiExtractor};
use super::history::{conversation_context, select_evidence, ChatMessage};
use super::patterns::PatternExtractor;
use super::ExtractionError;
use crate::entities::{DataKind, ExtractedData, Record};

/// Default number of recent messages consulted
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Default number of numeric tokens that make a message evidence
pub const DEFAULT_MIN_EVIDENCE_NUMBERS: usize = 2;

/// Input to one extraction
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// The user's request, used for intent
    pub query: &'a str,
    /// Text holding the data, when the caller already knows it
    pub evidence: Option<&'a str>,
    /// Earlier conversation, oldest first
    pub history: &'a [ChatMessage],
}

impl<'a> ExtractionRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            evidence: None,
            history: &[],
        }
    }

    pub fn with_evidence(mut self, evidence: &'a str) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_history(mut self, history: &'a [ChatMessage]) -> Self {
        self.history = history;
        self
    }
}

/// Which stage produced the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    Ai,
    Pattern,
}

impl std::fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStage::Ai => write!(f, "ai"),
            ExtractionStage::Pattern => write!(f, "pattern"),
        }
    }
}

/// Result of extracting every kind
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub data: ExtractedData,
    pub stage: ExtractionStage,
    /// Text the data was taken from
    pub evidence_text: String,
    /// Why the AI stage was skipped, when the pattern stage ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Result of extracting a single kind
#[derive(Debug, Clone, Serialize)]
pub struct KindExtraction {
    pub record: Record,
    pub stage: ExtractionStage,
    pub evidence_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Two-stage extraction: AI collaborator, then text patterns
pub struct ExtractionPipeline<'a> {
    ai: &'a dyn AiExtractor,
    patterns: PatternExtractor,
    history_window: usize,
    min_evidence_numbers: usize,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(ai: &'a dyn AiExtractor) -> Self {
        Self {
            ai,
            patterns: PatternExtractor::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            min_evidence_numbers: DEFAULT_MIN_EVIDENCE_NUMBERS,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_min_evidence_numbers(mut self, min_numbers: usize) -> Self {
        self.min_evidence_numbers = min_numbers;
        self
    }

    /// Extract every kind of data the request carries
    pub fn run(&self, request: &ExtractionRequest<'_>) -> Result<ExtractionOutcome, ExtractionError> {
        match self.ai_stage(request) {
            Ok(data) => {
                debug!(kinds = ?data.kinds(), "AI stage produced data");
                Ok(ExtractionOutcome {
                    data,
                    stage: ExtractionStage::Ai,
                    evidence_text: request.evidence.unwrap_or(request.query).to_string(),
                    fallback_reason: None,
                })
            }
            Err(reason) => {
                log_fallback(&reason, None);
                let (data, evidence_text) = self.pattern_stage(request);
                if data.is_empty() {
                    return Err(ExtractionError::NoStructuredData);
                }
                Ok(ExtractionOutcome {
                    data,
                    stage: ExtractionStage::Pattern,
                    evidence_text,
                    fallback_reason: Some(reason.to_string()),
                })
            }
        }
    }

    /// Extract one kind. An AI payload that lacks the kind also falls back.
    pub fn extract_kind(
        &self,
        kind: DataKind,
        request: &ExtractionRequest<'_>,
    ) -> Result<KindExtraction, ExtractionError> {
        let reason = match self.ai_stage(request) {
            Ok(data) => match data.record(kind) {
                Some(record) => {
                    debug!(%kind, "AI stage produced the requested kind");
                    return Ok(KindExtraction {
                        record,
                        stage: ExtractionStage::Ai,
                        evidence_text: request.evidence.unwrap_or(request.query).to_string(),
                        fallback_reason: None,
                    });
                }
                None => ExtractionError::MissingKind { kind },
            },
            Err(reason) => reason,
        };

        log_fallback(&reason, Some(kind));
        let (data, evidence_text) = self.pattern_stage(request);
        let record = data
            .record(kind)
            .ok_or_else(|| ExtractionError::no_data_of(kind))?;

        Ok(KindExtraction {
            record,
            stage: ExtractionStage::Pattern,
            evidence_text,
            fallback_reason: Some(reason.to_string()),
        })
    }

    fn ai_stage(&self, request: &ExtractionRequest<'_>) -> Result<ExtractedData, ExtractionError> {
        let mut context = conversation_context(request.history, self.history_window);
        if let Some(evidence) = request.evidence {
            if !context.is_empty() {
                context.push('\n');
            }
            context.push_str("Data: ");
            context.push_str(evidence);
        }

        let raw = self.ai.extract(request.query, &context)?;
        let data = decode_payload(&raw)?;
        if data.is_empty() {
            return Err(ExtractionError::AllNull);
        }
        Ok(data)
    }

    /// Evidence text first, then the query for any kind still missing
    fn pattern_stage(&self, request: &ExtractionRequest<'_>) -> (ExtractedData, String) {
        let evidence = match request.evidence {
            Some(evidence) => evidence,
            None => select_evidence(
                request.query,
                request.history,
                self.history_window,
                self.min_evidence_numbers,
            ),
        };
        debug!(evidence, "pattern stage");

        let mut data = self.patterns.extract_all(evidence);
        if evidence != request.query {
            let fallback = self.patterns.extract_all(request.query);
            if data.defect_data.is_none() {
                data.defect_data = fallback.defect_data;
            }
            if data.process_data.is_none() {
                data.process_data = fallback.process_data;
            }
            if data.cause_effect_data.is_none() {
                data.cause_effect_data = fallback.cause_effect_data;
            }
            if data.quality_metrics.is_empty() {
                data.quality_metrics = fallback.quality_metrics;
            }
        }

        data.defect_data = data
            .defect_data
            .map(|d| d.normalized())
            .filter(|d| d.point_count() > 0);
        data.process_data = data
            .process_data
            .map(|p| p.normalized())
            .filter(|p| p.point_count() > 0);

        (data, evidence.to_string())
    }
}

/// An absent collaborator is expected; anything else is worth a warning
fn log_fallback(reason: &ExtractionError, kind: Option<DataKind>) {
    match reason {
        ExtractionError::AiUnavailable(AiError::Unavailable) => {
            debug!(?kind, "no AI collaborator, using text patterns")
        }
        _ => warn!(%reason, ?kind, "AI extraction failed, falling back to text patterns"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DataSource;
    use crate::extract::{AiError, CannedResponse, NoAi};

    struct FailingAi;

    impl AiExtractor for FailingAi {
        fn extract(&self, _user_text: &str, _context: &str) -> Result<String, AiError> {
            Err(AiError::Failed("connection refused".to_string()))
        }
    }

    #[test]
    fn test_ai_stage_wins_when_it_succeeds() {
        let ai = CannedResponse::new(
            r#"{"defect_data": {"categories": ["Scratch", "Dent", "Burr"], "counts": [5, 3, 1]}}"#,
        );
        let pipeline = ExtractionPipeline::new(&ai);
        let outcome = pipeline
            .run(&ExtractionRequest::new("Scratch 50, Dent 30, Burr 10"))
            .unwrap();

        assert_eq!(outcome.stage, ExtractionStage::Ai);
        let defects = outcome.data.defect_data.unwrap();
        assert_eq!(defects.counts(), &[5, 3, 1]);
        assert_eq!(defects.source(), DataSource::AiExtraction);
    }

    #[test]
    fn test_every_ai_failure_falls_back() {
        let text = "Scratch 12, Dent 7, Burr 3";
        let malformed = CannedResponse::new("Sorry, I can't help with that.");
        let all_null = CannedResponse::new(r#"{"defect_data": null, "process_data": null}"#);

        for ai in [&NoAi as &dyn AiExtractor, &FailingAi, &malformed, &all_null] {
            let outcome = ExtractionPipeline::new(ai)
                .run(&ExtractionRequest::new(text))
                .unwrap();
            assert_eq!(outcome.stage, ExtractionStage::Pattern);
            assert!(outcome.fallback_reason.is_some());
            let defects = outcome.data.defect_data.unwrap();
            assert_eq!(defects.source(), DataSource::RegexExtraction);
            assert_eq!(defects.total_defects(), 22);
        }
    }

    #[test]
    fn test_no_data_anywhere_is_an_error() {
        let result = ExtractionPipeline::new(&NoAi).run(&ExtractionRequest::new("hello there"));
        assert!(matches!(result, Err(ExtractionError::NoStructuredData)));
    }

    #[test]
    fn test_history_supplies_evidence_but_not_intent() {
        let history = vec![
            ChatMessage::user("We saw Scratch 12, Dent 7, Burr 3 last week"),
            ChatMessage::assistant("Noted."),
        ];
        let request = ExtractionRequest::new("make a pareto chart").with_history(&history);
        let outcome = ExtractionPipeline::new(&NoAi).run(&request).unwrap();

        assert_eq!(outcome.evidence_text, "We saw Scratch 12, Dent 7, Burr 3 last week");
        assert_eq!(outcome.data.defect_data.unwrap().point_count(), 3);
        assert_eq!(request.query, "make a pareto chart");
    }

    #[test]
    fn test_explicit_evidence_wins_over_history() {
        let history = vec![ChatMessage::user("Scratch 12, Dent 7, Burr 3")];
        let request = ExtractionRequest::new("histogram please")
            .with_history(&history)
            .with_evidence("10.1, 10.2, 9.9, 10.0");
        let extraction = ExtractionPipeline::new(&NoAi)
            .extract_kind(DataKind::ProcessData, &request)
            .unwrap();

        assert_eq!(extraction.evidence_text, "10.1, 10.2, 9.9, 10.0");
        assert_eq!(extraction.record.point_count(), 4);
    }

    #[test]
    fn test_ai_payload_missing_kind_falls_back_for_that_kind() {
        let ai = CannedResponse::new(r#"{"process_data": {"measurements": [1.0, 2.0]}}"#);
        let extraction = ExtractionPipeline::new(&ai)
            .extract_kind(DataKind::DefectData, &ExtractionRequest::new("Scratch 4, Dent 2"))
            .unwrap();

        assert_eq!(extraction.stage, ExtractionStage::Pattern);
        assert_eq!(extraction.record.kind(), DataKind::DefectData);
    }

    #[test]
    fn test_missing_kind_error_names_kind() {
        let err = ExtractionPipeline::new(&NoAi)
            .extract_kind(DataKind::CauseEffectData, &ExtractionRequest::new("Scratch 4, Dent 2"))
            .unwrap_err();
        assert!(err.to_string().contains("cause-effect data"));
    }
}
