//! Text embeddings for tool matching
//!
//! The embedder is a collaborator behind a trait. Phrase embeddings are
//! memoized in an [`EmbeddingCache`] that is created once per process and
//! passed to whoever needs it.

use dashmap::DashMap;
use miette::Diagnostic;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// Bucket count of the hashing embedder
pub const HASHING_DIMENSIONS: usize = 256;

#[derive(Debug, Error, Diagnostic)]
pub enum EmbeddingError {
    #[error("Embedding failed: {0}")]
    #[diagnostic(code(tqa::embedding::failed))]
    Failed(String),
}

/// Turns text into a fixed-length vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Append-only memo of phrase embeddings, keyed by exact text
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: DashMap<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached embedding of `phrase`, computing it on first use
    pub fn get_or_embed(
        &self,
        phrase: &str,
        embedder: &dyn Embedder,
    ) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if let Some(hit) = self.entries.get(phrase) {
            return Ok(Arc::clone(hit.value()));
        }

        let vector = Arc::new(embedder.embed(phrase)?);
        let entry = self
            .entries
            .entry(phrase.to_string())
            .or_insert(vector);
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine similarity; 0 when either vector has zero norm or the lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "for", "to", "in", "on", "at", "by", "with", "from",
    "is", "are", "was", "were", "be", "it", "this", "that", "these", "those", "i", "we", "me",
    "my", "our", "you", "your", "can", "could", "would", "please", "some", "do", "does", "what",
    "how", "help", "need", "want", "us", "let",
];

/// Offline bag-of-words embedder.
///
/// Lowercased alphabetic tokens, minus stop words, are lightly stemmed and
/// hashed with SHA-256 into a fixed number of buckets; the counts are
/// L2-normalized.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: HASHING_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) % self.dimensions as u64) as usize
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        {
            vector[self.bucket(stem(token))] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

fn stem(token: &str) -> &str {
    for suffix in ["ing", "es", "ed", "s"] {
        if token.len() > suffix.len() + 3 {
            if let Some(stripped) = token.strip_suffix(suffix) {
                return stripped;
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[test]
    fn test_cache_embeds_each_phrase_once() {
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let cache = EmbeddingCache::new();

        let first = cache.get_or_embed("create histogram", &embedder).unwrap();
        let second = cache.get_or_embed("create histogram", &embedder).unwrap();
        cache.get_or_embed("build histogram", &embedder).unwrap();

        assert_eq!(first, second);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Generate a Pareto chart").unwrap();
        let b = embedder.embed("generate pareto chart").unwrap();
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hashing_embedder_ignores_numbers_and_stop_words() {
        let embedder = HashingEmbedder::default();
        let empty = embedder.embed("the 12 of 7").unwrap();
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_stemming() {
        assert_eq!(stem("charts"), "chart");
        assert_eq!(stem("monitoring"), "monitor");
        assert_eq!(stem("is"), "is");
    }
}
