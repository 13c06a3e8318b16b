//! Cause aggregation statistics for fishbone diagrams

use serde::Serialize;

use crate::entities::{CauseCategory, CauseEffectData};

/// Main-category count from which an analysis is considered complete
pub const COMPLETE_CATEGORY_COUNT: usize = 4;

/// Confidence from which root-cause work is considered done
pub const COMPLETED_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    Complete,
    Partial,
}

impl std::fmt::Display for Completeness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completeness::Complete => write!(f, "complete"),
            Completeness::Partial => write!(f, "partial"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Diversity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Diversity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diversity::High => write!(f, "high"),
            Diversity::Medium => write!(f, "medium"),
            Diversity::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCauseStatus {
    InProgress,
    Completed,
}

impl std::fmt::Display for RootCauseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootCauseStatus::InProgress => write!(f, "in progress"),
            RootCauseStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Causes recorded under one 6M category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: CauseCategory,
    pub causes: Vec<String>,
    pub count: usize,
}

/// Result of aggregating a cause-effect record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseReport {
    pub problem: String,
    pub total_sub_causes: usize,
    pub categories_with_causes: usize,
    pub analysis_completeness: Completeness,
    pub cause_diversity: Diversity,
    pub root_cause_status: RootCauseStatus,

    /// One entry per taxonomy category, in 6M order
    pub breakdown: Vec<CategoryBreakdown>,

    /// Main categories outside the 6M taxonomy
    pub unscored_categories: Vec<String>,
}

/// Aggregate sub-causes and label the depth of the analysis
pub fn analyze_causes(data: &CauseEffectData) -> CauseReport {
    let total_sub_causes: usize = data.sub_causes().values().map(Vec::len).sum();
    let categories_with_causes = data.sub_causes().values().filter(|c| !c.is_empty()).count();

    let analysis_completeness = if data.main_categories().len() >= COMPLETE_CATEGORY_COUNT {
        Completeness::Complete
    } else {
        Completeness::Partial
    };

    let cause_diversity = if total_sub_causes >= 10 {
        Diversity::High
    } else if total_sub_causes >= 5 {
        Diversity::Medium
    } else {
        Diversity::Low
    };

    let root_cause_status = if data.confidence() < COMPLETED_CONFIDENCE {
        RootCauseStatus::InProgress
    } else {
        RootCauseStatus::Completed
    };

    let breakdown = CauseCategory::ALL
        .into_iter()
        .map(|category| {
            // sub-cause keys may differ in case from the taxonomy name
            let causes: Vec<String> = data
                .sub_causes()
                .iter()
                .filter(|(key, _)| key.parse::<CauseCategory>().ok() == Some(category))
                .flat_map(|(_, causes)| causes.iter().cloned())
                .collect();
            CategoryBreakdown {
                category,
                count: causes.len(),
                causes,
            }
        })
        .collect();

    let unscored_categories = data
        .main_categories()
        .iter()
        .filter(|c| c.parse::<CauseCategory>().is_err())
        .cloned()
        .collect();

    CauseReport {
        problem: data.problem().to_string(),
        total_sub_causes,
        categories_with_causes,
        analysis_completeness,
        cause_diversity,
        root_cause_status,
        breakdown,
        unscored_categories,
    }
}
