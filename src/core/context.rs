//! Process-scoped assistant context
//!
//! Owns the collaborators (embedder, AI extractor, optional renderer), the
//! phrase embedding cache, and the configuration. Create one per process and
//! share it by reference.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::analysis::AnalysisError;
use crate::core::Config;
use crate::entities::Record;
use crate::extract::{
    AiExtractor, ExtractionError, ExtractionPipeline, ExtractionRequest, ExtractionStage, NoAi,
};
use crate::tools::{
    check_for_tool_generation, generate, ChartRenderer, Embedder, EmbeddingCache, EmbeddingError,
    GenerationCheck, HashingEmbedder, Recommender, RenderError, ToolId, ToolMatch, ToolReport,
};
use crate::validation::{validate_for_tool, ValidationError, ValidationReport};

/// Any failure between a query and a generated tool
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error("No quality tool matches: {query}")]
    #[diagnostic(
        code(tqa::pipeline::no_tool_match),
        help("Name the tool (\"generate pareto chart\") or pass it explicitly with --tool")
    )]
    NoToolMatch { query: String },
}

/// A record that passed the tool gate
#[derive(Debug, Clone, Serialize)]
pub struct PreparedRecord {
    pub tool: ToolId,
    pub record: Record,
    pub validation: ValidationReport,
    pub extraction_stage: ExtractionStage,
    pub evidence_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// A generated tool with its provenance
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTool {
    pub tool: ToolId,
    pub report: ToolReport,
    pub validation: ValidationReport,
    pub extraction_stage: ExtractionStage,
    pub evidence_text: String,
    #[serde(skip)]
    pub chart: Option<Vec<u8>>,
    pub generated_at: DateTime<Utc>,
}

pub struct AssistantContext {
    config: Config,
    embedder: Arc<dyn Embedder>,
    cache: EmbeddingCache,
    ai: Arc<dyn AiExtractor>,
    renderer: Option<Arc<dyn ChartRenderer>>,
}

impl AssistantContext {
    /// Context with the local hashing embedder and no AI collaborator
    pub fn new(config: Config) -> Self {
        Self {
            config,
            embedder: Arc::new(HashingEmbedder::default()),
            cache: EmbeddingCache::new(),
            ai: Arc::new(NoAi),
            renderer: None,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self.cache = EmbeddingCache::new();
        self
    }

    pub fn with_ai(mut self, ai: Arc<dyn AiExtractor>) -> Self {
        self.ai = ai;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn recommender(&self) -> Recommender<'_> {
        Recommender::new(self.embedder.as_ref(), &self.cache)
            .with_threshold(self.config.similarity_threshold)
    }

    pub fn pipeline(&self) -> ExtractionPipeline<'_> {
        ExtractionPipeline::new(self.ai.as_ref())
            .with_history_window(self.config.history_window)
            .with_min_evidence_numbers(self.config.min_evidence_numbers)
    }

    pub fn recommend(&self, query: &str) -> Result<Option<ToolMatch>, PipelineError> {
        Ok(self.recommender().recommend(query)?)
    }

    pub fn check_generation(
        &self,
        query: &str,
        evidence: Option<&str>,
    ) -> Result<Option<GenerationCheck>, PipelineError> {
        Ok(check_for_tool_generation(&self.recommender(), query, evidence)?)
    }

    /// Extract the record `tool` needs and run it through the tool gate
    pub fn prepare(
        &self,
        tool: ToolId,
        request: &ExtractionRequest<'_>,
    ) -> Result<PreparedRecord, PipelineError> {
        let spec = tool.spec();
        let extraction = self.pipeline().extract_kind(spec.required_data, request)?;
        let validation = validate_for_tool(&extraction.record, spec)?;
        debug!(%tool, stage = %extraction.stage, "record passed the tool gate");

        Ok(PreparedRecord {
            tool,
            record: extraction.record,
            validation,
            extraction_stage: extraction.stage,
            evidence_text: extraction.evidence_text,
            fallback_reason: extraction.fallback_reason,
        })
    }

    /// Route the query (or take `tool`), prepare, run the engine, and render
    pub fn generate(
        &self,
        request: &ExtractionRequest<'_>,
        tool: Option<ToolId>,
    ) -> Result<GeneratedTool, PipelineError> {
        let tool = match tool {
            Some(tool) => tool,
            None => self
                .recommender()
                .route(request.query)?
                .map(|matched| matched.tool)
                .ok_or_else(|| PipelineError::NoToolMatch {
                    query: request.query.to_string(),
                })?,
        };

        let prepared = self.prepare(tool, request)?;
        let report = generate(tool, &prepared.record, &self.config.generator_options())?;

        let chart = match &self.renderer {
            Some(renderer) => Some(renderer.render(&report, &prepared.record)?),
            None => None,
        };

        Ok(GeneratedTool {
            tool,
            report,
            validation: prepared.validation,
            extraction_stage: prepared.extraction_stage,
            evidence_text: prepared.evidence_text,
            chart,
            generated_at: Utc::now(),
        })
    }
}

impl Default for AssistantContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{CannedResponse, ChatMessage};

    struct ByteCountRenderer;

    impl ChartRenderer for ByteCountRenderer {
        fn render(&self, report: &ToolReport, _record: &Record) -> Result<Vec<u8>, RenderError> {
            Ok(report.tool().as_str().as_bytes().to_vec())
        }
    }

    #[test]
    fn test_generate_from_recommendation() {
        let context = AssistantContext::default();
        let request =
            ExtractionRequest::new("generate pareto chart").with_evidence("Scratch 15, Dent 8, Burr 4");
        let generated = context.generate(&request, None).unwrap();

        assert_eq!(generated.tool, ToolId::ParetoChart);
        assert_eq!(generated.extraction_stage, ExtractionStage::Pattern);
        match generated.report {
            ToolReport::ParetoChart(pareto) => {
                assert_eq!(pareto.total_defects, 27);
                assert_eq!(pareto.top_category, "Scratch");
            }
            other => panic!("unexpected report {:?}", other.tool()),
        }
        assert!(generated.chart.is_none());
        assert!(!context.cache().is_empty());
    }

    #[test]
    fn test_unmatched_query_without_tool() {
        let context = AssistantContext::default();
        let err = context
            .generate(&ExtractionRequest::new("what is for lunch"), None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoToolMatch { .. }));
    }

    #[test]
    fn test_capability_without_enough_data_names_the_shortfall() {
        let context = AssistantContext::default();
        let request = ExtractionRequest::new("capability").with_evidence("value 10.2");
        let err = context
            .generate(&request, Some(ToolId::ProcessCapability))
            .unwrap_err();
        match err {
            PipelineError::Validation(ValidationError::InsufficientData {
                required, actual, ..
            }) => {
                assert_eq!(required, 30);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_ai_payload_is_used_and_rendered() {
        let ai = CannedResponse::new(
            r#"```json
{"cause_effect_data": {"problem": "Leaks", "main_categories": ["Machine", "Method"],
  "sub_causes": {"Machine": ["Worn seal"], "Method": ["Torque skipped"]}}}
```"#,
        );
        let context = AssistantContext::default()
            .with_ai(Arc::new(ai))
            .with_renderer(Arc::new(ByteCountRenderer));

        let history = vec![ChatMessage::user("we keep seeing leaks")];
        let request = ExtractionRequest::new("why do leaks happen").with_history(&history);
        let generated = context
            .generate(&request, Some(ToolId::FishboneDiagram))
            .unwrap();

        assert_eq!(generated.extraction_stage, ExtractionStage::Ai);
        assert_eq!(generated.chart.as_deref(), Some(b"fishbone_diagram".as_slice()));
        match generated.report {
            ToolReport::FishboneDiagram(causes) => assert_eq!(causes.total_sub_causes, 2),
            other => panic!("unexpected report {:?}", other.tool()),
        }
    }
}
