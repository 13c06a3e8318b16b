//! Process data - ordered measurements with specification limits

use serde::{Deserialize, Serialize};

use super::DataSource;

/// Specification limits on a measured characteristic
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Specifications {
    /// Upper specification limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usl: Option<f64>,

    /// Lower specification limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lsl: Option<f64>,

    /// Target (nominal) value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl Specifications {
    /// Both limits; target defaults to the midpoint
    pub fn with_limits(usl: f64, lsl: f64) -> Self {
        Self {
            usl: Some(usl),
            lsl: Some(lsl),
            target: Some((usl + lsl) / 2.0),
        }
    }

    /// True when no key is set
    pub fn is_empty(&self) -> bool {
        self.usl.is_none() && self.lsl.is_none() && self.target.is_none()
    }

    /// (usl, lsl) when both are present
    pub fn limits(&self) -> Option<(f64, f64)> {
        match (self.usl, self.lsl) {
            (Some(usl), Some(lsl)) => Some((usl, lsl)),
            _ => None,
        }
    }

    /// Explicit target, else the midpoint of the limits
    pub fn target_or_midpoint(&self) -> Option<f64> {
        self.target
            .or_else(|| self.limits().map(|(usl, lsl)| (usl + lsl) / 2.0))
    }

    /// Names of the missing limits ("usl", "lsl")
    pub fn missing_limits(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.usl.is_none() {
            missing.push("usl");
        }
        if self.lsl.is_none() {
            missing.push("lsl");
        }
        missing
    }

    /// False only when both limits exist and usl <= lsl
    pub fn is_ordered(&self) -> bool {
        self.limits().map_or(true, |(usl, lsl)| usl > lsl)
    }
}

/// Process measurements in collection order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessData {
    measurements: Vec<f64>,
    specifications: Specifications,
    sample_size: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    process_name: Option<String>,

    source: DataSource,
}

impl ProcessData {
    pub fn new(measurements: Vec<f64>, specifications: Specifications, source: DataSource) -> Self {
        let sample_size = measurements.len();
        Self {
            measurements,
            specifications,
            sample_size,
            process_name: None,
            source,
        }
    }

    /// Attach the process name
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    /// Measurements in collection order. Order is load-bearing for control charts.
    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }

    pub fn specifications(&self) -> &Specifications {
        &self.specifications
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn process_name(&self) -> Option<&str> {
        self.process_name.as_deref()
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Data points as counted by the tool gate: one per measurement
    pub fn point_count(&self) -> usize {
        self.measurements.len()
    }

    /// Drop non-finite and non-positive measurements, preserving order
    pub fn normalized(&self) -> Self {
        let measurements = self
            .measurements
            .iter()
            .copied()
            .filter(|m| m.is_finite() && *m > 0.0)
            .collect();
        let mut normalized = Self::new(measurements, self.specifications, self.source);
        normalized.process_name = self.process_name.clone();
        normalized
    }
}
