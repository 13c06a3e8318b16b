//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::control_chart::DEFAULT_SUBGROUP_SIZE;
use crate::extract::pipeline::{DEFAULT_HISTORY_WINDOW, DEFAULT_MIN_EVIDENCE_NUMBERS};
use crate::tools::generator::GeneratorOptions;
use crate::tools::DEFAULT_SIMILARITY_THRESHOLD;

/// Name of the per-directory config folder
pub const LOCAL_DIR: &str = ".tqa";

/// One layer as written on disk; absent keys leave lower layers in place
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    similarity_threshold: Option<f64>,
    subgroup_size: Option<usize>,
    history_window: Option<usize>,
    min_evidence_numbers: Option<usize>,
    default_format: Option<String>,
}

/// Effective TQA configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Similarity a query must reach to match a tool
    pub similarity_threshold: f64,

    /// Subgroup size for X-bar/R charts
    pub subgroup_size: usize,

    /// Recent messages consulted for evidence
    pub history_window: usize,

    /// Numeric tokens that make a message evidence
    pub min_evidence_numbers: usize,

    /// Default output format
    pub default_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            subgroup_size: DEFAULT_SUBGROUP_SIZE,
            history_window: DEFAULT_HISTORY_WINDOW,
            min_evidence_numbers: DEFAULT_MIN_EVIDENCE_NUMBERS,
            default_format: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let local = std::env::current_dir()
            .ok()
            .map(|dir| Self::local_config_path(&dir));
        Self::load_from(Self::global_config_path().as_deref(), local.as_deref())
    }

    /// Load with explicit file locations; environment variables still apply
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tqa/config.yaml)
        if let Some(layer) = global.and_then(read_layer) {
            config.merge(layer);
        }

        // 3. Local config (.tqa/config.yaml)
        if let Some(layer) = local.and_then(read_layer) {
            config.merge(layer);
        }

        // 4. Environment variables
        if let Some(threshold) = env_parse("TQA_SIMILARITY_THRESHOLD") {
            config.similarity_threshold = threshold;
        }
        if let Some(size) = env_parse("TQA_SUBGROUP_SIZE") {
            config.subgroup_size = size;
        }
        if let Some(window) = env_parse("TQA_HISTORY_WINDOW") {
            config.history_window = window;
        }

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tqa")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Path of the local config file under `dir`
    pub fn local_config_path(dir: &Path) -> PathBuf {
        dir.join(LOCAL_DIR).join("config.yaml")
    }

    /// Engine options derived from this configuration
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            subgroup_size: self.subgroup_size,
            ..Default::default()
        }
    }

    /// Merge another layer into this one (other takes precedence)
    fn merge(&mut self, other: ConfigLayer) {
        if let Some(threshold) = other.similarity_threshold {
            self.similarity_threshold = threshold;
        }
        if let Some(size) = other.subgroup_size {
            self.subgroup_size = size;
        }
        if let Some(window) = other.history_window {
            self.history_window = window;
        }
        if let Some(min) = other.min_evidence_numbers {
            self.min_evidence_numbers = min;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }
}

fn read_layer(path: &Path) -> Option<ConfigLayer> {
    if !path.exists() {
        return None;
    }
    let contents = std::fs::read_to_string(path).ok()?;
    serde_yml::from_str::<ConfigLayer>(&contents).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}
