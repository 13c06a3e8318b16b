//! Defect data - categorized defect counts for Pareto analysis

use serde::Serialize;

use super::DataSource;

/// Defect categories with their counts, in discovery order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectData {
    categories: Vec<String>,
    counts: Vec<u64>,
    frequencies: Vec<f64>,
    total_defects: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    time_period: Option<String>,

    source: DataSource,
}

impl DefectData {
    /// Build from parallel category/count sequences.
    ///
    /// The sequences are stored as given; a length mismatch is reported by the
    /// validator rather than rejected here, since AI payloads can carry one.
    /// The total saturates at `u64::MAX`; see [`DefectData::checked_total`].
    pub fn new(categories: Vec<String>, counts: Vec<u64>, source: DataSource) -> Self {
        let total_defects = counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
        let frequencies = counts
            .iter()
            .map(|&count| {
                if total_defects > 0 {
                    count as f64 / total_defects as f64
                } else {
                    0.0
                }
            })
            .collect();

        Self {
            categories,
            counts,
            frequencies,
            total_defects,
            time_period: None,
            source,
        }
    }

    /// Sum of `counts`, or `None` when it does not fit in a `u64`
    pub fn checked_total(counts: &[u64]) -> Option<u64> {
        counts.iter().try_fold(0u64, |acc, &c| acc.checked_add(c))
    }

    /// Build from (category, count) pairs, which keeps both sequences aligned
    pub fn from_pairs(pairs: Vec<(String, u64)>, source: DataSource) -> Self {
        let (categories, counts) = pairs.into_iter().unzip();
        Self::new(categories, counts, source)
    }

    /// Attach the time period the counts cover
    pub fn with_time_period(mut self, period: impl Into<String>) -> Self {
        self.time_period = Some(period.into());
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// count / total for every category (all zero when the total is zero)
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn total_defects(&self) -> u64 {
        self.total_defects
    }

    pub fn time_period(&self) -> Option<&str> {
        self.time_period.as_deref()
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Whether categories and counts line up index for index
    pub fn is_aligned(&self) -> bool {
        self.categories.len() == self.counts.len()
    }

    /// Data points as counted by the tool gate: one per category
    pub fn point_count(&self) -> usize {
        self.categories.len()
    }

    /// Iterate (category, count, frequency) triples
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64, f64)> + '_ {
        self.categories
            .iter()
            .zip(&self.counts)
            .zip(&self.frequencies)
            .map(|((category, &count), &frequency)| (category.as_str(), count, frequency))
    }

    /// Clean up extracted categories.
    ///
    /// Trims labels, drops empty labels and zero counts, and merges labels
    /// that differ only by case into the first-seen spelling and position.
    pub fn normalized(&self) -> Self {
        let mut merged: Vec<(String, u64)> = Vec::new();

        for (category, &count) in self.categories.iter().zip(&self.counts) {
            let label = category.trim();
            if label.is_empty() || count == 0 {
                continue;
            }

            match merged
                .iter_mut()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(label))
            {
                Some((_, total)) => *total = total.saturating_add(count),
                None => merged.push((label.to_string(), count)),
            }
        }

        let mut normalized = Self::from_pairs(merged, self.source);
        normalized.time_period = self.time_period.clone();
        normalized
    }
}
