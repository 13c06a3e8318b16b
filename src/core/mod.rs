//! Core module - configuration and the process-scoped context

pub mod config;
pub mod context;

pub use config::Config;
pub use context::{AssistantContext, GeneratedTool, PipelineError, PreparedRecord};
