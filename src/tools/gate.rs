//! Generation gate: can the matched tool be built from the data at hand?

use serde::Serialize;

use super::embedding::EmbeddingError;
use super::recommender::{MatchMethod, Recommender, ToolMatch};
use super::registry::ToolId;
use crate::entities::{DataKind, ExtractedData, Record};
use crate::extract::PatternExtractor;

/// Recommendation plus the data-sufficiency verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationCheck {
    pub tool_match: ToolMatch,
    pub can_generate: bool,
    pub required_data: DataKind,
    pub min_data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<Record>,
    pub extracted_points: usize,
    pub data_sufficient: bool,
    pub should_generate: bool,
}

impl GenerationCheck {
    /// User-facing message for this check
    pub fn suggestion(&self) -> String {
        let tool = self.tool_match.name;
        if self.should_generate {
            format!(
                "I can generate a {} for you!\n\
                 I found sufficient data in your message to create this tool automatically.\n\n\
                 Type 'Generate {}' to create it, or ask me to help you with the data if needed.",
                tool, tool
            )
        } else if self.can_generate && !self.data_sufficient {
            format!(
                "I can generate a {} for you!\n\
                 However, I need more {} to create it. I need at least {} data points.\n\n\
                 Please provide more specific data, or ask me to help you structure the information.",
                tool,
                title_case(self.required_data.label()),
                self.min_data_points
            )
        } else {
            format!(
                "Recommended Quality Tool: {} (Confidence: {:.1}%)\n{}",
                tool,
                self.tool_match.confidence * 100.0,
                self.tool_match.when_to_use
            )
        }
    }
}

/// Route `query` to a tool and check whether the data supports it.
///
/// Routing is [`Recommender::route`]: similarity, then tool keywords. Data is taken from `evidence` when given, then from the query for a kind
/// the evidence did not yield. `None` when no tool matches.
pub fn check_for_tool_generation(
    recommender: &Recommender<'_>,
    query: &str,
    evidence: Option<&str>,
) -> Result<Option<GenerationCheck>, EmbeddingError> {
    let Some(tool_match) = recommender.route(query)? else {
        return Ok(None);
    };

    let spec = tool_match.tool.spec();
    let extractor = PatternExtractor::new();
    let extracted = evidence
        .and_then(|text| extract_kind(&extractor, spec.required_data, text))
        .or_else(|| extract_kind(&extractor, spec.required_data, query));

    let extracted_points = extracted.as_ref().map_or(0, Record::point_count);
    let data_sufficient = extracted.is_some() && extracted_points >= spec.min_data_points;

    Ok(Some(GenerationCheck {
        can_generate: spec.can_generate,
        required_data: spec.required_data,
        min_data_points: spec.min_data_points,
        extracted,
        extracted_points,
        data_sufficient,
        should_generate: spec.can_generate && data_sufficient,
        tool_match,
    }))
}

fn extract_kind(extractor: &PatternExtractor, kind: DataKind, text: &str) -> Option<Record> {
    match kind {
        DataKind::DefectData => extractor
            .extract_defect_data(text)
            .map(|d| d.normalized())
            .filter(|d| d.point_count() > 0)
            .map(Record::Defect),
        DataKind::ProcessData => extractor
            .extract_process_data(text)
            .map(|p| p.normalized())
            .filter(|p| p.point_count() > 0)
            .map(Record::Process),
        DataKind::CauseEffectData => extractor
            .extract_cause_effect_data(text)
            .map(Record::CauseEffect),
        DataKind::QualityMetrics => {
            let metrics = extractor.extract_quality_metrics(text);
            (!metrics.is_empty()).then_some(Record::Metrics { metrics })
        }
    }
}

/// Follow-up questions that would collect what `tool` still needs
pub fn data_collection_questions(tool: ToolId, extracted: &ExtractedData) -> Vec<String> {
    let spec = tool.spec();
    let min = spec.min_data_points;

    match spec.required_data {
        DataKind::DefectData => match &extracted.defect_data {
            None => vec![
                "What types of defects or problems are you seeing?".to_string(),
                "How many of each type of defect occurred?".to_string(),
                "What time period does this data cover?".to_string(),
            ],
            Some(d) if d.point_count() < min => vec![format!(
                "Can you provide more defect categories? I need at least {} different types.",
                min
            )],
            Some(_) => Vec::new(),
        },
        DataKind::ProcessData => match &extracted.process_data {
            None => vec![
                "What are the actual measurement values from your process?".to_string(),
                "What are the specification limits (USL and LSL)?".to_string(),
                "What is the target value for this process?".to_string(),
            ],
            Some(p) if p.point_count() < min => vec![format!(
                "Can you provide more measurement data? I need at least {} data points.",
                min
            )],
            Some(_) => Vec::new(),
        },
        DataKind::CauseEffectData => match &extracted.cause_effect_data {
            None => vec![
                "What is the specific problem you're trying to solve?".to_string(),
                "What are the main cause categories (Man, Machine, Material, Method, Measurement, Environment)?".to_string(),
                "What specific sub-causes can you identify for each category?".to_string(),
            ],
            Some(c) if c.point_count() < min => vec![format!(
                "Can you identify more cause categories? I need at least {} different categories.",
                min
            )],
            Some(_) => Vec::new(),
        },
        DataKind::QualityMetrics => Vec::new(),
    }
}

fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
