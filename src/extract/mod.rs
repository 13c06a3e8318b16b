//! Extraction - turning free-form text into structured records
//!
//! Two stages: the AI collaborator first, then the deterministic pattern
//! extractor when the AI stage fails for any reason.

pub mod ai;
pub mod diagnostics;
pub mod history;
pub mod patterns;
pub mod pipeline;

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::DataKind;

pub use ai::{decode_payload, AiError, AiExtractor, CannedResponse, NoAi};
pub use diagnostics::AiPayloadError;
pub use history::{conversation_context, select_evidence, ChatMessage, Role};
pub use patterns::{count_numbers, PatternExtractor};
pub use pipeline::{
    ExtractionOutcome, ExtractionPipeline, ExtractionRequest, ExtractionStage, KindExtraction,
};

/// Why a stage could not produce a record
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractionError {
    #[error("No structured data could be extracted from the text")]
    #[diagnostic(
        code(tqa::extract::no_data),
        help("Include category/count pairs (\"Scratch 12, Dent 7\"), measurements, or a \"Problem:\" statement")
    )]
    NoStructuredData,

    #[error("No {} could be extracted from the text", .kind.label())]
    #[diagnostic(code(tqa::extract::no_data_of_kind))]
    NoDataOfKind {
        kind: DataKind,
        #[help]
        hint: &'static str,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    AiUnavailable(#[from] AiError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    AiPayload(#[from] AiPayloadError),

    #[error("AI extraction returned no data")]
    #[diagnostic(code(tqa::extract::all_null))]
    AllNull,

    #[error("AI extraction returned no {}", .kind.label())]
    #[diagnostic(code(tqa::extract::missing_kind))]
    MissingKind { kind: DataKind },
}

impl ExtractionError {
    /// No record of `kind` was found
    pub fn no_data_of(kind: DataKind) -> Self {
        ExtractionError::NoDataOfKind {
            kind,
            hint: kind_help(kind),
        }
    }
}

fn kind_help(kind: DataKind) -> &'static str {
    match kind {
        DataKind::DefectData => "Give defect categories with counts, e.g. \"Scratch 12, Dent 7, Burr 3\"",
        DataKind::ProcessData => "Give the measured values, e.g. \"10.1, 10.3, 9.9\", and spec limits",
        DataKind::CauseEffectData => "State the problem (\"Problem: ...\") and causes (\"Machine: ...\")",
        DataKind::QualityMetrics => "Report figures such as \"Cpk 1.2\" or \"yield 97%\"",
    }
}
