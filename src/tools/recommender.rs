//! Similarity-based tool recommendation, with keyword routing for generation requests

use serde::Serialize;
use tracing::debug;

use super::embedding::{cosine_similarity, Embedder, EmbeddingCache, EmbeddingError};
use super::keywords::detect_tool;
use super::registry::{ToolId, ToolSpec, TOOLS};

/// Similarity a query must reach to match a tool
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// How a tool was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Similarity,
    Keyword,
}

/// The best-matching tool for a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMatch {
    pub tool: ToolId,
    pub name: &'static str,
    pub when_to_use: &'static str,
    /// Cosine similarity of the tool's best phrase
    pub confidence: f64,
    /// Best phrase, or the keyword for keyword matches
    pub matched_phrase: &'static str,
    pub matched_by: MatchMethod,
}

impl ToolMatch {
    fn new(
        spec: &ToolSpec,
        confidence: f64,
        matched_phrase: &'static str,
        matched_by: MatchMethod,
    ) -> Self {
        Self {
            tool: spec.id,
            name: spec.name,
            when_to_use: spec.when_to_use,
            confidence,
            matched_phrase,
            matched_by,
        }
    }
}

/// Best phrase score of one tool
struct ToolScore {
    spec: &'static ToolSpec,
    score: f64,
    phrase: &'static str,
}

/// Matches queries against every tool description phrase
pub struct Recommender<'a> {
    embedder: &'a dyn Embedder,
    cache: &'a EmbeddingCache,
    threshold: f64,
}

impl<'a> Recommender<'a> {
    pub fn new(embedder: &'a dyn Embedder, cache: &'a EmbeddingCache) -> Self {
        Self {
            embedder,
            cache,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Global arg-max over all phrases of all tools.
    ///
    /// The first phrase wins ties. A best similarity at or above the
    /// threshold is a match.
    pub fn recommend(&self, query: &str) -> Result<Option<ToolMatch>, EmbeddingError> {
        let scores = self.tool_scores(query)?;
        Ok(self.best_match(&scores))
    }

    /// Pick the tool for a generation request.
    ///
    /// Similarity first; when nothing reaches the threshold, a tool named
    /// by keyword in the query is taken, carrying its own best similarity.
    pub fn route(&self, query: &str) -> Result<Option<ToolMatch>, EmbeddingError> {
        let scores = self.tool_scores(query)?;
        if let Some(matched) = self.best_match(&scores) {
            return Ok(Some(matched));
        }

        let Some((tool, keyword)) = detect_tool(query) else {
            return Ok(None);
        };
        let confidence = scores
            .iter()
            .find(|s| s.spec.id == tool)
            .map_or(0.0, |s| s.score);
        debug!(%tool, keyword, confidence, "tool named by keyword");

        Ok(Some(ToolMatch::new(tool.spec(), confidence, keyword, MatchMethod::Keyword)))
    }

    /// Best phrase per tool, in table order
    fn tool_scores(&self, query: &str) -> Result<Vec<ToolScore>, EmbeddingError> {
        let query_vector = self.embedder.embed(&query.to_lowercase())?;

        let mut scores = Vec::with_capacity(TOOLS.len());
        for spec in TOOLS.iter() {
            let mut best: Option<ToolScore> = None;
            for &phrase in spec.descriptions {
                let phrase_vector = self.cache.get_or_embed(phrase, self.embedder)?;
                let score = cosine_similarity(&query_vector, &phrase_vector);
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(ToolScore { spec, score, phrase });
                }
            }
            scores.extend(best);
        }
        Ok(scores)
    }

    fn best_match(&self, scores: &[ToolScore]) -> Option<ToolMatch> {
        let best = scores
            .iter()
            .fold(None, |best: Option<&ToolScore>, s| match best {
                Some(b) if s.score <= b.score => Some(b),
                _ => Some(s),
            })?;
        debug!(
            tool = %best.spec.id,
            score = best.score,
            phrase = best.phrase,
            "best tool phrase"
        );

        (best.score >= self.threshold)
            .then(|| ToolMatch::new(best.spec, best.score, best.phrase, MatchMethod::Similarity))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One dimension per tool, set by keyword
    pub(crate) struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let text = text.to_lowercase();
            let keywords: [&[&str]; 5] = [
                &["pareto", "frequen", "common", "prioritize", "occurrence"],
                &["fishbone", "root cause", "ishikawa", "why", "cause and effect", "source", "diagnose"],
                &["control chart", "variation over time", "trend", "shift", "out of control", "track", "monitor"],
                &["histogram", "distribution", "spread", "visualize", "patterns"],
                &["capability", "cpk", "specification", "performance", "process variation"],
            ];
            Ok(keywords
                .iter()
                .map(|words| words.iter().filter(|w| text.contains(*w)).count() as f32)
                .collect())
        }
    }

    #[test]
    fn test_recommends_matching_tool() {
        let cache = EmbeddingCache::new();
        let recommender = Recommender::new(&KeywordEmbedder, &cache);

        let matched = recommender.recommend("Generate a Pareto chart").unwrap().unwrap();
        assert_eq!(matched.tool, ToolId::ParetoChart);
        assert!((matched.confidence - 1.0).abs() < 1e-9);

        let matched = recommender.recommend("draw me a histogram").unwrap().unwrap();
        assert_eq!(matched.tool, ToolId::Histogram);
    }

    #[test]
    fn test_unrelated_query_has_no_match() {
        let cache = EmbeddingCache::new();
        let recommender = Recommender::new(&KeywordEmbedder, &cache);
        assert!(recommender.recommend("what time is lunch").unwrap().is_none());
    }

    #[test]
    fn test_phrases_are_cached_across_queries() {
        let cache = EmbeddingCache::new();
        let recommender = Recommender::new(&KeywordEmbedder, &cache);
        recommender.recommend("pareto").unwrap();
        let after_first = cache.len();
        recommender.recommend("histogram").unwrap();
        assert_eq!(after_first, 40);
        assert_eq!(cache.len(), after_first);
    }

    #[test]
    fn test_route_prefers_similarity() {
        let cache = EmbeddingCache::new();
        let recommender = Recommender::new(&KeywordEmbedder, &cache);
        let matched = recommender.route("draw me a histogram").unwrap().unwrap();
        assert_eq!(matched.tool, ToolId::Histogram);
        assert_eq!(matched.matched_by, MatchMethod::Similarity);
    }

    #[test]
    fn test_route_falls_back_to_keywords() {
        let cache = EmbeddingCache::new();
        let recommender = Recommender::new(&KeywordEmbedder, &cache).with_threshold(2.0);
        let query = "Create a Pareto chart: scratch 15, dent 8, crack 5";

        assert!(recommender.recommend(query).unwrap().is_none());
        let matched = recommender.route(query).unwrap().unwrap();
        assert_eq!(matched.tool, ToolId::ParetoChart);
        assert_eq!(matched.matched_by, MatchMethod::Keyword);
        assert_eq!(matched.matched_phrase, "pareto");
        assert!((matched.confidence - 1.0).abs() < 1e-9);

        assert!(recommender.route("what time is lunch").unwrap().is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let cache = EmbeddingCache::new();
        let exact = Recommender::new(&KeywordEmbedder, &cache).with_threshold(1.0);
        assert!(exact.recommend("create histogram").unwrap().is_some());
    }
}
