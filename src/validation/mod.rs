//! Record validation
//!
//! Validation is advisory: it never mutates a record. Only the hard-invalid
//! cases (no defects, misaligned categories/counts) set `is_valid = false`,
//! and callers must not run statistics on such a record.

pub mod gate;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::entities::{CauseEffectData, DataKind, DefectData, ProcessData, QualityMetrics, Record};

pub use gate::validate_for_tool;

/// Threshold below which a defect total is flagged as a small sample
pub const LOW_DEFECT_TOTAL: u64 = 5;

/// Measurement count below which capability figures are unreliable
pub const CAPABILITY_SAMPLE_FLOOR: usize = 30;

/// Outcome of validating one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationReport {
    pub fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
    }

    /// Turn a hard-invalid report into an error
    pub fn into_result(self, kind: DataKind) -> Result<ValidationReport, ValidationError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(ValidationError::Invalid {
                kind,
                errors: self.errors.join("; "),
                help: if self.suggestions.is_empty() {
                    None
                } else {
                    Some(self.suggestions.join("\n"))
                },
            })
        }
    }
}

/// A record that cannot be used, or a tool requirement that is not met
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Invalid {}: {errors}", .kind.label())]
    #[diagnostic(code(tqa::validation::invalid))]
    Invalid {
        kind: DataKind,
        errors: String,
        #[help]
        help: Option<String>,
    },

    #[error("{tool} requires {}, found {}", .required.label(), .found.label())]
    #[diagnostic(code(tqa::validation::wrong_kind))]
    WrongKind {
        tool: &'static str,
        required: DataKind,
        found: DataKind,
    },

    #[error("{tool} needs at least {required} {unit}, found {actual}")]
    #[diagnostic(code(tqa::validation::insufficient_data))]
    InsufficientData {
        tool: &'static str,
        unit: &'static str,
        required: usize,
        actual: usize,
        #[help]
        help: Option<String>,
    },

    #[error("{tool} needs both specification limits; missing: {missing}")]
    #[diagnostic(
        code(tqa::validation::missing_spec_limits),
        help("Add the limits to the text, e.g. \"USL: 10.5, LSL: 9.5\" or \"spec 9.5-10.5\"")
    )]
    MissingSpecLimits { tool: &'static str, missing: String },

    #[error("{tool}: USL ({usl}) must be greater than LSL ({lsl})")]
    #[diagnostic(code(tqa::validation::invalid_spec_limits))]
    InvalidSpecLimits {
        tool: &'static str,
        usl: f64,
        lsl: f64,
    },
}

/// Advisory checks over a record
pub trait Validate {
    fn validate(&self) -> ValidationReport;
}

impl Validate for DefectData {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.total_defects() == 0 {
            report.error("No defects found in data");
        }
        if !self.is_aligned() {
            report.error("Mismatch between categories and counts");
        }
        if self.total_defects() < LOW_DEFECT_TOTAL {
            report.warning("Low sample size may affect statistical significance");
        }
        report
    }
}

impl Validate for ProcessData {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.measurements().len() < CAPABILITY_SAMPLE_FLOOR {
            report.warning("Sample size less than 30 may affect process capability calculations");
        }
        if self.specifications().is_empty() {
            report.warning("No specification limits found");
            report.suggestion("Consider adding USL and LSL for process capability analysis");
        } else if !self.specifications().is_ordered() {
            report.warning("USL is not greater than LSL");
        }
        report
    }
}

impl Validate for CauseEffectData {
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.main_categories().is_empty() {
            report.warning("No cause categories identified");
            report.suggestion(
                "Consider using 6M framework: Man, Machine, Material, Method, Measurement, Environment",
            );
        }
        report
    }
}

impl Validate for [QualityMetrics] {
    fn validate(&self) -> ValidationReport {
        ValidationReport::default()
    }
}

impl Validate for Record {
    fn validate(&self) -> ValidationReport {
        match self {
            Record::Defect(d) => d.validate(),
            Record::Process(p) => p.validate(),
            Record::CauseEffect(c) => c.validate(),
            Record::Metrics { metrics } => metrics.as_slice().validate(),
        }
    }
}
