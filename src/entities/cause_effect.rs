//! Cause-effect data - problem statement with 6M cause categories

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for a missing problem statement
pub const UNSPECIFIED_PROBLEM: &str = "Unspecified problem";

/// The six standard cause categories (6M taxonomy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CauseCategory {
    Man,
    Machine,
    Material,
    Method,
    Measurement,
    Environment,
}

impl CauseCategory {
    /// Taxonomy in its canonical order
    pub const ALL: [CauseCategory; 6] = [
        CauseCategory::Man,
        CauseCategory::Machine,
        CauseCategory::Material,
        CauseCategory::Method,
        CauseCategory::Measurement,
        CauseCategory::Environment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CauseCategory::Man => "Man",
            CauseCategory::Machine => "Machine",
            CauseCategory::Material => "Material",
            CauseCategory::Method => "Method",
            CauseCategory::Measurement => "Measurement",
            CauseCategory::Environment => "Environment",
        }
    }
}

impl std::fmt::Display for CauseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CauseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "man" => Ok(CauseCategory::Man),
            "machine" => Ok(CauseCategory::Machine),
            "material" => Ok(CauseCategory::Material),
            "method" => Ok(CauseCategory::Method),
            "measurement" => Ok(CauseCategory::Measurement),
            "environment" => Ok(CauseCategory::Environment),
            _ => Err(format!(
                "Unknown cause category: {}. Use Man, Machine, Material, Method, Measurement, or Environment",
                s
            )),
        }
    }
}

/// A problem and the causes grouped under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseEffectData {
    problem: String,
    main_categories: Vec<String>,
    sub_causes: BTreeMap<String, Vec<String>>,
    confidence: f64,
}

impl CauseEffectData {
    /// Build a record. An empty problem becomes the placeholder, duplicate
    /// categories are dropped, and confidence is clamped to [0, 1].
    pub fn new(
        problem: impl Into<String>,
        main_categories: Vec<String>,
        sub_causes: BTreeMap<String, Vec<String>>,
        confidence: f64,
    ) -> Self {
        let problem = problem.into();
        let problem = if problem.trim().is_empty() {
            UNSPECIFIED_PROBLEM.to_string()
        } else {
            problem.trim().to_string()
        };

        let mut categories: Vec<String> = Vec::with_capacity(main_categories.len());
        for category in main_categories {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            problem,
            main_categories: categories,
            sub_causes,
            confidence,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn main_categories(&self) -> &[String] {
        &self.main_categories
    }

    pub fn sub_causes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.sub_causes
    }

    /// Causes listed under `category` (empty when none)
    pub fn causes_for(&self, category: &str) -> &[String] {
        self.sub_causes
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Data points as counted by the tool gate: one per main category
    pub fn point_count(&self) -> usize {
        self.main_categories.len()
    }

    /// Main categories that belong to the 6M taxonomy
    pub fn taxonomy_categories(&self) -> Vec<CauseCategory> {
        self.main_categories
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect()
    }
}
