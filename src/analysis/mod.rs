//! Statistical engines
//!
//! Every engine is a pure function of an immutable record: running it twice
//! on the same record yields identical output.

pub mod capability;
pub mod cause;
pub mod control_chart;
pub mod distribution;
pub mod normality;
pub mod pareto;

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::DataKind;

pub use capability::{analyze_capability, CapabilityGrade, CapabilityReport};
pub use cause::{analyze_causes, CauseReport};
pub use control_chart::{
    analyze_control_chart, individuals_chart, xbar_r_chart, ControlChartReport, ControlMode,
};
pub use distribution::{analyze_distribution, DistributionReport, HistogramBin};
pub use normality::{shapiro_wilk, NormalityTest};
pub use pareto::{analyze_pareto, AbcClass, ParetoEntry, ParetoReport};

/// A statistical precondition that was not met
#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("{analysis} requires at least {required} measurements, got {actual}")]
    #[diagnostic(
        code(tqa::analysis::insufficient_data),
        help("Collect more measurements before running this analysis")
    )]
    InsufficientData {
        analysis: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{analysis} requires both USL and LSL; missing: {missing}")]
    #[diagnostic(
        code(tqa::analysis::missing_spec_limits),
        help("Capability indices are undefined without both specification limits")
    )]
    MissingSpecLimits {
        analysis: &'static str,
        missing: String,
    },

    #[error("USL ({usl}) must be greater than LSL ({lsl})")]
    #[diagnostic(code(tqa::analysis::invalid_spec_limits))]
    InvalidSpecLimits { usl: f64, lsl: f64 },

    #[error("{0} has no data to analyze")]
    #[diagnostic(code(tqa::analysis::empty_input))]
    EmptyInput(&'static str),

    #[error("Categories ({categories}) and counts ({counts}) differ in length")]
    #[diagnostic(code(tqa::analysis::misaligned_input))]
    MisalignedInput { categories: usize, counts: usize },

    #[error("Invalid subgroup size {0}; use a size of at least 2")]
    #[diagnostic(
        code(tqa::analysis::invalid_subgroup_size),
        help("Shewhart constants are tabulated for subgroup sizes 2 to 10")
    )]
    InvalidSubgroupSize(usize),

    #[error("{0}: the measurements have zero variation")]
    #[diagnostic(
        code(tqa::analysis::zero_variation),
        help("All measurements are identical, so the indices are undefined")
    )]
    ZeroVariation(&'static str),

    #[error("{tool} requires {}, got {}", .required.label(), .found.label())]
    #[diagnostic(code(tqa::analysis::wrong_data_kind))]
    WrongDataKind {
        tool: &'static str,
        required: DataKind,
        found: DataKind,
    },
}

/// Arithmetic mean; callers guarantee a non-empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected standard deviation; 0 for fewer than two values
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sorted copy of `values`
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolated percentile of sorted data, `q` in [0, 1]
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
