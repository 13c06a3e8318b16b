//! Pattern-based extraction of quality data from free text
//!
//! Matching is case-insensitive; captured labels keep the user's spelling.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::entities::{
    CauseCategory, CauseEffectData, DataSource, DefectData, ExtractedData, ProcessData,
    QualityMetrics, Specifications,
};

/// Confidence when at least one 6M category was found
pub const CATEGORY_CONFIDENCE: f64 = 0.7;

/// Confidence when only a problem statement was found
pub const PROBLEM_ONLY_CONFIDENCE: f64 = 0.3;

/// A defect phrase pattern and which capture holds the label vs. the count
struct DefectPattern {
    regex: Regex,
    label_group: usize,
    count_group: usize,
}

static DEFECT_PATTERNS: Lazy<Vec<DefectPattern>> = Lazy::new(|| {
    vec![
        // "12 defects in welding"
        DefectPattern {
            regex: Regex::new(
                r"(?i)(\d+)\s+(?:defects?|issues?|problems?|failures?)\s+(?:in|of|for)\s+([^,;\n]+)",
            )
            .expect("Invalid regex pattern"),
            label_group: 2,
            count_group: 1,
        },
        // "Porosity: 7" / "Porosity: 7 times"
        DefectPattern {
            regex: Regex::new(
                r"(?i)([^,;:\n]+):\s*(\d+)\b\s*(?:times?|occurrences?|instances?)?",
            )
            .expect("Invalid regex pattern"),
            label_group: 1,
            count_group: 2,
        },
        // "9 times of misalignment"
        DefectPattern {
            regex: Regex::new(r"(?i)(\d+)\s+(?:times?|occurrences?)\s+(?:of|for)\s+([^,;\n]+)")
                .expect("Invalid regex pattern"),
            label_group: 2,
            count_group: 1,
        },
        // "Surface scratch 15" / "Burr 4 defects"
        DefectPattern {
            regex: Regex::new(r"(?i)([^,;:\d\n]+?)\s+(\d+)\b\s*(?:defects?|issues?|problems?)?")
                .expect("Invalid regex pattern"),
            label_group: 1,
            count_group: 2,
        },
    ]
});

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d*\.\d+|\d+").expect("Invalid regex pattern"));

static USL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:usl|upper spec(?:ification)? limit)\s*[:=]?\s*(-?\d*\.?\d+)")
        .expect("Invalid regex pattern")
});

static LSL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:lsl|lower spec(?:ification)? limit)\s*[:=]?\s*(-?\d*\.?\d+)")
        .expect("Invalid regex pattern")
});

static SPEC_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bspec(?:ification)?s?(?:\s+limits?)?\s*:?\s*(\d*\.?\d+)\s*(?:-|–|to)\s*(\d*\.?\d+)",
    )
    .expect("Invalid regex pattern")
});

static TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:target|nominal)\s*[:=]?\s*(-?\d*\.?\d+)").expect("Invalid regex pattern")
});

static PROBLEM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["problem", "issue", "defect", "failure"]
        .iter()
        .map(|word| {
            Regex::new(&format!(r"(?i)\b{}\s*:\s*([^,;\n]+)", word)).expect("Invalid regex pattern")
        })
        .collect()
});

static CATEGORY_PATTERNS: Lazy<Vec<(CauseCategory, Regex)>> = Lazy::new(|| {
    CauseCategory::ALL
        .iter()
        .map(|category| {
            let regex = Regex::new(&format!(
                r"(?i)\b{}\s*:\s*([^,;\n]+)",
                category.name().to_lowercase()
            ))
            .expect("Invalid regex pattern");
            (*category, regex)
        })
        .collect()
});

static METRIC_PATTERNS: Lazy<Vec<(&'static str, Option<&'static str>, Regex)>> = Lazy::new(|| {
    vec![
        (
            "Cp/Cpk",
            None,
            Regex::new(r"(?i)\b(?:cpk|cpu|cpl|cp)\s*[:=]?\s*(\d*\.?\d+)")
                .expect("Invalid regex pattern"),
        ),
        (
            "Yield",
            Some("%"),
            Regex::new(r"(?i)\b(?:first pass yield|yield)\s*[:=]?\s*(\d*\.?\d+)\s*%?")
                .expect("Invalid regex pattern"),
        ),
        (
            "Defect Rate",
            None,
            Regex::new(r"(?i)\b(?:defect rate|dpmo|dpu|dpo)\s*[:=]?\s*(\d*\.?\d+)")
                .expect("Invalid regex pattern"),
        ),
        (
            "Sigma Level",
            None,
            Regex::new(r"(?i)\b(?:sigma level|sigma)\s*[:=]?\s*(\d*\.?\d+)")
                .expect("Invalid regex pattern"),
        ),
    ]
});

/// Stateless extractor for the four data kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every extractor over `text`
    pub fn extract_all(&self, text: &str) -> ExtractedData {
        ExtractedData {
            defect_data: self.extract_defect_data(text),
            process_data: self.extract_process_data(text),
            cause_effect_data: self.extract_cause_effect_data(text),
            quality_metrics: self.extract_quality_metrics(text),
        }
    }

    /// Extract (category, count) pairs.
    ///
    /// Patterns are tried in order and a match is kept only when its span does
    /// not overlap an earlier kept match. Kept matches are returned in text order.
    pub fn extract_defect_data(&self, text: &str) -> Option<DefectData> {
        let mut taken: Vec<(Range<usize>, String, u64)> = Vec::new();

        for pattern in DEFECT_PATTERNS.iter() {
            for caps in pattern.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let span = whole.range();
                if taken.iter().any(|(r, _, _)| overlaps(r, &span)) {
                    continue;
                }

                let label = caps.get(pattern.label_group).map_or("", |m| m.as_str());
                let count = caps.get(pattern.count_group).map_or("", |m| m.as_str());

                // A non-numeric count gets one retry with the groups swapped
                let pair = match count.trim().parse::<u64>() {
                    Ok(n) => Some((label, n)),
                    Err(_) => label.trim().parse::<u64>().ok().map(|n| (count, n)),
                };

                let Some((label, count)) = pair else { continue };
                let label = clean_label(label);
                if label.is_empty() {
                    continue;
                }

                taken.push((span, label, count));
            }
        }

        if taken.is_empty() {
            return None;
        }

        taken.sort_by_key(|(span, _, _)| span.start);
        let pairs = taken
            .into_iter()
            .map(|(_, label, count)| (label, count))
            .collect();

        Some(DefectData::from_pairs(pairs, DataSource::RegexExtraction))
    }

    /// Extract every positive numeric token as a measurement, plus spec limits.
    ///
    /// Numbers used for the limits are measurements too; callers that need a
    /// clean series supply the limits separately.
    pub fn extract_process_data(&self, text: &str) -> Option<ProcessData> {
        let measurements: Vec<f64> = NUMBER
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .collect();

        if measurements.is_empty() {
            return None;
        }

        Some(ProcessData::new(
            measurements,
            self.extract_specifications(text),
            DataSource::RegexExtraction,
        ))
    }

    /// Extract USL/LSL/target from labels or a "spec 9.5-10.5" range
    pub fn extract_specifications(&self, text: &str) -> Specifications {
        let mut specs = Specifications::default();

        if let Some(caps) = SPEC_RANGE.captures(text) {
            let first = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
            let second = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
            if let (Some(a), Some(b)) = (first, second) {
                specs.usl = Some(a.max(b));
                specs.lsl = Some(a.min(b));
            }
        }

        if let Some(usl) = first_number(&USL, text) {
            specs.usl = Some(usl);
        }
        if let Some(lsl) = first_number(&LSL, text) {
            specs.lsl = Some(lsl);
        }

        specs.target = first_number(&TARGET, text);
        if specs.target.is_none() {
            specs.target = specs.limits().map(|(usl, lsl)| (usl + lsl) / 2.0);
        }

        specs
    }

    /// Extract a problem statement and "Category: cause" entries
    pub fn extract_cause_effect_data(&self, text: &str) -> Option<CauseEffectData> {
        let problem = PROBLEM_PATTERNS.iter().find_map(|regex| {
            regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|p| !p.is_empty())
        });

        let mut main_categories = Vec::new();
        let mut sub_causes = BTreeMap::new();

        for (category, regex) in CATEGORY_PATTERNS.iter() {
            let causes: Vec<String> = regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|cause| !cause.is_empty())
                .collect();

            if !causes.is_empty() {
                main_categories.push(category.name().to_string());
                sub_causes.insert(category.name().to_string(), causes);
            }
        }

        if problem.is_none() && main_categories.is_empty() {
            return None;
        }

        let confidence = if main_categories.is_empty() {
            PROBLEM_ONLY_CONFIDENCE
        } else {
            CATEGORY_CONFIDENCE
        };

        Some(CauseEffectData::new(
            problem.unwrap_or_default(),
            main_categories,
            sub_causes,
            confidence,
        ))
    }

    /// Extract named metrics; one record per numeric match
    pub fn extract_quality_metrics(&self, text: &str) -> Vec<QualityMetrics> {
        let mut metrics = Vec::new();

        for (name, unit, regex) in METRIC_PATTERNS.iter() {
            for caps in regex.captures_iter(text) {
                let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
                    continue;
                };
                let metric = QualityMetrics::new(*name, value);
                metrics.push(match unit {
                    Some(unit) => metric.with_unit(*unit),
                    None => metric,
                });
            }
        }

        metrics
    }
}

/// Count numeric tokens in `text`
pub fn count_numbers(text: &str) -> usize {
    NUMBER.find_iter(text).count()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn first_number(regex: &Regex, text: &str) -> Option<f64> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Trim whitespace, trailing punctuation and a leading conjunction
fn clean_label(raw: &str) -> String {
    let mut label = raw.trim().trim_end_matches(['.', '!', '?']).trim();

    for prefix in ["and ", "or ", "& "] {
        let head = label.get(..prefix.len());
        if label.len() > prefix.len() && head.is_some_and(|h| h.eq_ignore_ascii_case(prefix)) {
            label = label[prefix.len()..].trim_start();
            break;
        }
    }

    label.to_string()
}
