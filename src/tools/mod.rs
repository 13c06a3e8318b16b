//! Quality tools - table, recommendation and routing, generation gate, and generation

pub mod embedding;
pub mod gate;
pub mod generator;
pub mod keywords;
pub mod recommender;
pub mod registry;

pub use embedding::{cosine_similarity, Embedder, EmbeddingCache, EmbeddingError, HashingEmbedder};
pub use gate::{check_for_tool_generation, data_collection_questions, GenerationCheck};
pub use generator::{generate, ChartRenderer, GeneratorOptions, RenderError, ToolReport};
pub use keywords::detect_tool;
pub use recommender::{MatchMethod, Recommender, ToolMatch, DEFAULT_SIMILARITY_THRESHOLD};
pub use registry::{ToolId, ToolSpec, TOOLS};
