//! Shewhart control charts: X-bar/R and Individuals/Moving Range
//!
//! Measurements must be in collection order; subgroups are consecutive runs.

use serde::{Deserialize, Serialize};

use super::{mean, AnalysisError};
use crate::entities::{ProcessData, Specifications};

/// Fewest raw measurements for an X-bar/R chart
pub const XBAR_MIN_MEASUREMENTS: usize = 5;

/// Fewest raw measurements for an Individuals/MR chart
pub const INDIVIDUALS_MIN_MEASUREMENTS: usize = 2;

/// Default subgroup size
pub const DEFAULT_SUBGROUP_SIZE: usize = 5;

/// 3 / d2 for n = 2
const E2: f64 = 2.66;

/// D4 for n = 2
const MR_D4: f64 = 3.27;

/// Shewhart constants for one subgroup size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartConstants {
    pub subgroup_size: usize,
    pub a2: f64,
    pub d3: f64,
    pub d4: f64,
}

#[rustfmt::skip]
static CONSTANTS: [ChartConstants; 9] = [
    ChartConstants { subgroup_size: 2, a2: 1.880, d3: 0.0, d4: 3.267 },
    ChartConstants { subgroup_size: 3, a2: 1.023, d3: 0.0, d4: 2.575 },
    ChartConstants { subgroup_size: 4, a2: 0.729, d3: 0.0, d4: 2.282 },
    ChartConstants { subgroup_size: 5, a2: 0.577, d3: 0.0, d4: 2.115 },
    ChartConstants { subgroup_size: 6, a2: 0.483, d3: 0.0, d4: 2.004 },
    ChartConstants { subgroup_size: 7, a2: 0.419, d3: 0.076, d4: 1.924 },
    ChartConstants { subgroup_size: 8, a2: 0.373, d3: 0.136, d4: 1.864 },
    ChartConstants { subgroup_size: 9, a2: 0.337, d3: 0.184, d4: 1.816 },
    ChartConstants { subgroup_size: 10, a2: 0.308, d3: 0.223, d4: 1.777 },
];

impl ChartConstants {
    /// Constants for `subgroup_size`; sizes outside 2-10 use the size-5 row
    pub fn for_size(subgroup_size: usize) -> ChartConstants {
        CONSTANTS
            .iter()
            .find(|c| c.subgroup_size == subgroup_size)
            .copied()
            .unwrap_or(CONSTANTS[3])
    }
}

/// Which chart pair to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    #[default]
    XbarR,
    Individuals,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlMode::XbarR => write!(f, "X-bar/R"),
            ControlMode::Individuals => write!(f, "Individuals/MR"),
        }
    }
}

/// Result of a control-chart analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlChartReport {
    pub mode: ControlMode,

    /// Subgroup size, for X-bar/R
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_size: Option<usize>,

    /// Plotted points: subgroup means or individual values
    pub points: Vec<f64>,

    /// Grand mean (X-bar) or mean of individuals
    pub center_line: f64,
    pub ucl: f64,
    pub lcl: f64,

    /// Subgroup ranges or moving ranges
    pub ranges: Vec<f64>,

    /// Mean range or mean moving range
    pub mean_range: f64,
    pub range_ucl: f64,
    pub range_lcl: f64,

    /// Indices of points outside the control limits
    pub out_of_control: Vec<usize>,

    /// Indices of ranges outside the range-chart limits
    pub range_out_of_control: Vec<usize>,

    /// Measurements dropped from an incomplete trailing subgroup
    pub discarded: usize,

    /// Specification limits, echoed for the renderer
    pub specifications: Specifications,
}

impl ControlChartReport {
    pub fn out_of_control_count(&self) -> usize {
        self.out_of_control.len()
    }

    /// Stable when no plotted point breaches its limits
    pub fn is_stable(&self) -> bool {
        self.out_of_control.is_empty()
    }
}

/// Build the chart for `mode`
pub fn analyze_control_chart(
    data: &ProcessData,
    mode: ControlMode,
    subgroup_size: usize,
) -> Result<ControlChartReport, AnalysisError> {
    match mode {
        ControlMode::XbarR => xbar_r_chart(data, subgroup_size),
        ControlMode::Individuals => individuals_chart(data),
    }
}

/// X-bar/R chart over consecutive subgroups of `subgroup_size`
pub fn xbar_r_chart(
    data: &ProcessData,
    subgroup_size: usize,
) -> Result<ControlChartReport, AnalysisError> {
    if subgroup_size < 2 {
        return Err(AnalysisError::InvalidSubgroupSize(subgroup_size));
    }

    let measurements = data.measurements();
    let required = XBAR_MIN_MEASUREMENTS.max(subgroup_size);
    if measurements.len() < required {
        return Err(AnalysisError::InsufficientData {
            analysis: "X-bar/R chart",
            required,
            actual: measurements.len(),
        });
    }

    let subgroups: Vec<&[f64]> = measurements.chunks_exact(subgroup_size).collect();
    let discarded = measurements.len() % subgroup_size;

    let means: Vec<f64> = subgroups.iter().map(|g| mean(g)).collect();
    let ranges: Vec<f64> = subgroups.iter().map(|g| range(g)).collect();

    let grand_mean = mean(&means);
    let mean_range = mean(&ranges);
    let constants = ChartConstants::for_size(subgroup_size);

    let ucl = grand_mean + constants.a2 * mean_range;
    let lcl = grand_mean - constants.a2 * mean_range;
    let range_ucl = constants.d4 * mean_range;
    let range_lcl = constants.d3 * mean_range;

    Ok(ControlChartReport {
        mode: ControlMode::XbarR,
        subgroup_size: Some(subgroup_size),
        out_of_control: outside(&means, lcl, ucl),
        range_out_of_control: outside(&ranges, range_lcl, range_ucl),
        points: means,
        center_line: grand_mean,
        ucl,
        lcl,
        ranges,
        mean_range,
        range_ucl,
        range_lcl,
        discarded,
        specifications: *data.specifications(),
    })
}

/// Individuals chart with a two-point moving range
pub fn individuals_chart(data: &ProcessData) -> Result<ControlChartReport, AnalysisError> {
    let values = data.measurements();
    if values.len() < INDIVIDUALS_MIN_MEASUREMENTS {
        return Err(AnalysisError::InsufficientData {
            analysis: "Individuals/MR chart",
            required: INDIVIDUALS_MIN_MEASUREMENTS,
            actual: values.len(),
        });
    }

    let moving_ranges: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let center = mean(values);
    let mean_mr = mean(&moving_ranges);

    let ucl = center + E2 * mean_mr;
    let lcl = center - E2 * mean_mr;
    let range_ucl = MR_D4 * mean_mr;

    Ok(ControlChartReport {
        mode: ControlMode::Individuals,
        subgroup_size: None,
        points: values.to_vec(),
        center_line: center,
        ucl,
        lcl,
        out_of_control: outside(values, lcl, ucl),
        range_out_of_control: outside(&moving_ranges, 0.0, range_ucl),
        ranges: moving_ranges,
        mean_range: mean_mr,
        range_ucl,
        range_lcl: 0.0,
        discarded: 0,
        specifications: *data.specifications(),
    })
}

fn range(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Indices strictly above `upper` or strictly below `lower`
fn outside(values: &[f64], lower: f64, upper: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > upper || **v < lower)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DataSource;

    fn process(values: Vec<f64>) -> ProcessData {
        ProcessData::new(values, Specifications::default(), DataSource::ManualInput)
    }

    #[test]
    fn test_constant_series_has_collapsed_limits() {
        let report = xbar_r_chart(&process(vec![10.0; 20]), 5).unwrap();
        assert_eq!(report.points.len(), 4);
        assert_eq!(report.mean_range, 0.0);
        assert_eq!(report.ucl, 10.0);
        assert_eq!(report.lcl, 10.0);
        assert_eq!(report.out_of_control_count(), 0);
        assert!(report.is_stable());
    }

    #[test]
    fn test_xbar_r_limits() {
        let values = vec![
            1.0, 2.0, 3.0, 4.0, 5.0, // mean 3, range 4
            2.0, 3.0, 4.0, 5.0, 6.0, // mean 4, range 4
            3.0, // dropped
        ];
        let report = xbar_r_chart(&process(values), 5).unwrap();
        assert_eq!(report.discarded, 1);
        assert_eq!(report.points, vec![3.0, 4.0]);
        assert_eq!(report.ranges, vec![4.0, 4.0]);
        assert!((report.center_line - 3.5).abs() < 1e-12);
        assert!((report.ucl - (3.5 + 0.577 * 4.0)).abs() < 1e-12);
        assert!((report.lcl - (3.5 - 0.577 * 4.0)).abs() < 1e-12);
        assert!((report.range_ucl - 2.115 * 4.0).abs() < 1e-12);
        assert_eq!(report.range_lcl, 0.0);
    }

    #[test]
    fn test_shift_is_flagged() {
        let mut values = vec![10.0, 10.2, 9.8, 10.1, 9.9].repeat(15);
        values.extend([13.0, 13.2, 12.8, 13.1, 12.9]);
        let report = xbar_r_chart(&process(values), 5).unwrap();
        assert_eq!(report.out_of_control, vec![15]);
        assert!(!report.is_stable());
    }

    #[test]
    fn test_individuals_moving_range() {
        let report = individuals_chart(&process(vec![1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert_eq!(report.ranges, vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(report.mean_range, 1.0);
        assert!((report.center_line - 3.0).abs() < 1e-12);
        assert!((report.ucl - 5.66).abs() < 1e-12);
        assert!((report.lcl - 0.34).abs() < 1e-12);
        assert!((report.range_ucl - 3.27).abs() < 1e-12);
        assert!(report.is_stable());
    }

    #[test]
    fn test_preconditions() {
        assert!(matches!(
            xbar_r_chart(&process(vec![1.0, 2.0, 3.0, 4.0]), 2),
            Err(AnalysisError::InsufficientData { required: 5, actual: 4, .. })
        ));
        assert!(matches!(
            xbar_r_chart(&process(vec![1.0; 10]), 1),
            Err(AnalysisError::InvalidSubgroupSize(1))
        ));
        assert!(matches!(
            individuals_chart(&process(vec![1.0])),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_unknown_size_uses_size_five_constants() {
        assert_eq!(ChartConstants::for_size(12).a2, 0.577);
        assert_eq!(ChartConstants::for_size(7).d3, 0.076);
    }

    #[test]
    fn test_rerun_is_identical() {
        let data = process(vec![5.1, 4.9, 5.3, 5.0, 5.2, 4.8, 5.1, 5.0, 4.9, 5.2]);
        assert_eq!(
            analyze_control_chart(&data, ControlMode::XbarR, 5).unwrap(),
            analyze_control_chart(&data, ControlMode::XbarR, 5).unwrap()
        );
    }
}
