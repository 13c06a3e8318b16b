//! Pareto analysis - ranking defect categories by contribution

use serde::Serialize;

use super::AnalysisError;
use crate::entities::DefectData;

/// Cumulative percentage up to which a category is class A
pub const CLASS_A_LIMIT: f64 = 80.0;

/// Cumulative percentage up to which a category is class B
pub const CLASS_B_LIMIT: f64 = 95.0;

/// ABC classification of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn from_cumulative(cumulative_percentage: f64) -> Self {
        if cumulative_percentage <= CLASS_A_LIMIT {
            AbcClass::A
        } else if cumulative_percentage <= CLASS_B_LIMIT {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl std::fmt::Display for AbcClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

/// How concentrated the defects are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effectiveness {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Effectiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effectiveness::High => write!(f, "high"),
            Effectiveness::Medium => write!(f, "medium"),
            Effectiveness::Low => write!(f, "low"),
        }
    }
}

/// One row of the Pareto table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    /// 1-based rank by count
    pub rank: usize,
    pub category: String,
    pub count: u64,
    /// Share of the total, 0-1
    pub frequency: f64,
    /// Share of the total, 0-100
    pub percentage: f64,
    pub cumulative_percentage: f64,
    pub class: AbcClass,
}

/// Result of a Pareto analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoReport {
    /// Entries sorted by count, descending; ties keep input order
    pub entries: Vec<ParetoEntry>,

    pub total_defects: u64,

    pub top_category: String,
    pub top_category_count: u64,
    pub top_category_percentage: f64,

    /// Number of class A entries (cumulative at or under 80%)
    pub pareto_80_categories: usize,

    /// Cumulative percentage at the last class A entry, 0 when there is none
    pub pareto_80_percentage: f64,

    pub top_3_categories: Vec<String>,
    pub top_3_percentage: f64,

    pub effectiveness: Effectiveness,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<String>,
}

impl ParetoReport {
    pub fn categories(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.count).collect()
    }

    pub fn cumulative_percentages(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.cumulative_percentage).collect()
    }

    /// Entries in class A, the "vital few"
    pub fn vital_few(&self) -> impl Iterator<Item = &ParetoEntry> {
        self.entries.iter().filter(|e| e.class == AbcClass::A)
    }
}

/// Rank defect categories and classify them A/B/C
pub fn analyze_pareto(data: &DefectData) -> Result<ParetoReport, AnalysisError> {
    if data.categories().is_empty() || data.total_defects() == 0 {
        return Err(AnalysisError::EmptyInput("Pareto analysis"));
    }
    if !data.is_aligned() {
        return Err(AnalysisError::MisalignedInput {
            categories: data.categories().len(),
            counts: data.counts().len(),
        });
    }

    let mut rows: Vec<(&str, u64, f64)> = data.entries().collect();
    // sort_by is stable, so equal counts keep discovery order
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    let mut cumulative = 0.0;
    let entries: Vec<ParetoEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (category, count, frequency))| {
            cumulative += frequency;
            let cumulative_percentage = cumulative * 100.0;
            ParetoEntry {
                rank: i + 1,
                category: category.to_string(),
                count,
                frequency,
                percentage: frequency * 100.0,
                cumulative_percentage,
                class: AbcClass::from_cumulative(cumulative_percentage),
            }
        })
        .collect();

    let pareto_80_categories = entries
        .iter()
        .filter(|e| e.cumulative_percentage <= CLASS_A_LIMIT)
        .count();
    let pareto_80_percentage = if pareto_80_categories > 0 {
        entries[pareto_80_categories - 1].cumulative_percentage
    } else {
        0.0
    };

    let top_3: Vec<&ParetoEntry> = entries.iter().take(3).collect();
    let top_3_percentage = top_3.iter().map(|e| e.frequency).sum::<f64>() * 100.0;

    let effectiveness = if pareto_80_categories <= 3 {
        Effectiveness::High
    } else if pareto_80_categories <= 5 {
        Effectiveness::Medium
    } else {
        Effectiveness::Low
    };

    let top = &entries[0];
    Ok(ParetoReport {
        total_defects: data.total_defects(),
        top_category: top.category.clone(),
        top_category_count: top.count,
        top_category_percentage: top.percentage,
        pareto_80_categories,
        pareto_80_percentage,
        top_3_categories: top_3.iter().map(|e| e.category.clone()).collect(),
        top_3_percentage,
        effectiveness,
        time_period: data.time_period().map(str::to_string),
        entries,
    })
}
