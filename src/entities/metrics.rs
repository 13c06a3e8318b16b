//! Quality metrics - individually reported figures (Cpk, yield, sigma, ...)

use serde::{Deserialize, Serialize};

/// Direction a metric is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "increasing" => Ok(Trend::Increasing),
            "decreasing" => Ok(Trend::Decreasing),
            "stable" => Ok(Trend::Stable),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

/// A single named quality figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub metric_name: String,

    pub value: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl QualityMetrics {
    pub fn new(metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            target: None,
            threshold: None,
            unit: None,
            trend: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}
