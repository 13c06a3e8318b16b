//! Distribution summary and histogram of process measurements

use serde::Serialize;

use super::normality::{shapiro_wilk, NormalityTest};
use super::{mean, percentile, sample_std, sorted, AnalysisError};
use crate::entities::{ProcessData, Specifications};

/// Fewest measurements for a distribution summary
pub const DISTRIBUTION_MIN_MEASUREMENTS: usize = 5;

/// Distance from the mean, in standard deviations, beyond which a value is an outlier
pub const OUTLIER_SIGMA: f64 = 3.0;

/// Upper bound on histogram bins, whatever the bin-width rule asks for
pub const MAX_HISTOGRAM_BINS: usize = 100;

/// One histogram bin; the last bin is closed on the right
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Result of a distribution analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub sample_size: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,

    /// Most frequent value, only when some value repeats
    pub mode: Option<f64>,

    pub min: f64,
    pub max: f64,
    pub range: f64,

    /// Sample skewness; absent for zero variance
    pub skewness: Option<f64>,

    /// Sample excess kurtosis; absent for zero variance
    pub kurtosis: Option<f64>,

    /// Shapiro-Wilk result; absent above 5000 measurements
    pub normality: Option<NormalityTest>,

    /// Undefined, not false, when the test was not run
    pub is_normal: Option<bool>,

    pub outliers_detected: bool,
    pub outlier_indices: Vec<usize>,

    pub bins: Vec<HistogramBin>,
    pub bin_width: f64,

    pub specifications: Specifications,
}

/// Summarize the shape of the measurements
pub fn analyze_distribution(data: &ProcessData) -> Result<DistributionReport, AnalysisError> {
    let values = data.measurements();
    let n = values.len();
    if n < DISTRIBUTION_MIN_MEASUREMENTS {
        return Err(AnalysisError::InsufficientData {
            analysis: "Distribution analysis",
            required: DISTRIBUTION_MIN_MEASUREMENTS,
            actual: n,
        });
    }

    let sorted_values = sorted(values);
    let mu = mean(values);
    let std_dev = sample_std(values);
    let min = sorted_values[0];
    let max = sorted_values[n - 1];

    let (skewness, kurtosis) = moments(values, mu);
    let normality = shapiro_wilk(values);

    let outlier_indices: Vec<usize> = if std_dev > 0.0 {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| (**v - mu).abs() > OUTLIER_SIGMA * std_dev)
            .map(|(i, _)| i)
            .collect()
    } else {
        Vec::new()
    };

    let (bins, bin_width) = histogram(&sorted_values);

    Ok(DistributionReport {
        sample_size: n,
        mean: mu,
        std_dev,
        median: percentile(&sorted_values, 0.5),
        mode: mode(&sorted_values),
        min,
        max,
        range: max - min,
        skewness,
        kurtosis,
        is_normal: normality.map(|t| t.is_normal()),
        normality,
        outliers_detected: !outlier_indices.is_empty(),
        outlier_indices,
        bins,
        bin_width,
        specifications: *data.specifications(),
    })
}

/// Biased skewness g1 and excess kurtosis g2
fn moments(values: &[f64], mu: f64) -> (Option<f64>, Option<f64>) {
    let n = values.len() as f64;
    let m2 = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    if m2 <= 0.0 {
        return (None, None);
    }
    let m3 = values.iter().map(|v| (v - mu).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - mu).powi(4)).sum::<f64>() / n;
    (Some(m3 / m2.powf(1.5)), Some(m4 / (m2 * m2) - 3.0))
}

/// Most frequent value of sorted data; the smallest wins ties
fn mode(sorted_values: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted_values.len() {
        let value = sorted_values[i];
        let run = sorted_values[i..].iter().take_while(|v| **v == value).count();
        if run > 1 && best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Equal-width bins using the smaller of the Sturges and Freedman-Diaconis widths.
///
/// The count never exceeds the number of values or `MAX_HISTOGRAM_BINS`.
fn histogram(sorted_values: &[f64]) -> (Vec<HistogramBin>, f64) {
    let n = sorted_values.len();
    let mut first = sorted_values[0];
    let mut last = sorted_values[n - 1];
    let data_span = last - first;
    if first == last {
        first -= 0.5;
        last += 0.5;
    }
    let span = last - first;

    let sturges = data_span / ((n as f64).log2() + 1.0);
    let iqr = percentile(sorted_values, 0.75) - percentile(sorted_values, 0.25);
    let fd = 2.0 * iqr * (n as f64).powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

    let bin_count = if width > 0.0 {
        ((span / width).ceil() as usize)
            .min(n)
            .min(MAX_HISTOGRAM_BINS)
            .max(1)
    } else {
        1
    };
    let bin_width = span / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for v in sorted_values {
        let index = (((v - first) / span) * bin_count as f64).floor() as usize;
        counts[index.min(bin_count - 1)] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: first + bin_width * i as f64,
            upper: if i + 1 == bin_count {
                last
            } else {
                first + bin_width * (i + 1) as f64
            },
            count,
        })
        .collect();

    (bins, bin_width)
}
