//! Process capability (Cp/Cpk) under a normal model

use serde::Serialize;

use super::normality::normal_cdf;
use super::{mean, sample_std, AnalysisError};
use crate::entities::ProcessData;

/// Fewest measurements for a capability study
pub const CAPABILITY_MIN_MEASUREMENTS: usize = 30;

/// Cpk at or above which a process is capable
pub const CAPABLE_CPK: f64 = 1.33;

/// Letter grade for a Cpk value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapabilityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl CapabilityGrade {
    /// Step function over Cpk
    pub fn from_cpk(cpk: f64) -> Self {
        if cpk >= 1.67 {
            CapabilityGrade::APlus
        } else if cpk >= 1.33 {
            CapabilityGrade::A
        } else if cpk >= 1.0 {
            CapabilityGrade::B
        } else if cpk >= 0.67 {
            CapabilityGrade::C
        } else {
            CapabilityGrade::D
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CapabilityGrade::APlus => "Excellent",
            CapabilityGrade::A => "Good",
            CapabilityGrade::B => "Marginal",
            CapabilityGrade::C => "Poor",
            CapabilityGrade::D => "Unacceptable",
        }
    }
}

impl std::fmt::Display for CapabilityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityGrade::APlus => write!(f, "A+"),
            CapabilityGrade::A => write!(f, "A"),
            CapabilityGrade::B => write!(f, "B"),
            CapabilityGrade::C => write!(f, "C"),
            CapabilityGrade::D => write!(f, "D"),
        }
    }
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Capable,
    Marginal,
    Incapable,
}

impl std::fmt::Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assessment::Capable => write!(f, "capable"),
            Assessment::Marginal => write!(f, "marginal"),
            Assessment::Incapable => write!(f, "incapable"),
        }
    }
}

/// How urgently the process needs work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Result of a capability study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityReport {
    pub sample_size: usize,

    /// Sample mean
    pub mean: f64,

    /// Sample standard deviation (n - 1)
    pub std_dev: f64,

    pub usl: f64,
    pub lsl: f64,
    pub target: f64,
    pub tolerance: f64,

    pub cp: f64,
    pub cpu: f64,
    pub cpl: f64,
    pub cpk: f64,

    /// Cpk * 3
    pub sigma_level: f64,

    pub z_usl: f64,
    pub z_lsl: f64,

    /// Expected fraction out of specification
    pub defect_rate: f64,

    /// Expected parts per million out of specification
    pub ppm: f64,

    pub grade: CapabilityGrade,
    pub grade_description: &'static str,
    pub is_capable: bool,
    pub meets_6sigma: bool,
    pub assessment: Assessment,
    pub improvement_priority: Priority,
}

/// Compute capability indices
pub fn analyze_capability(data: &ProcessData) -> Result<CapabilityReport, AnalysisError> {
    let values = data.measurements();
    if values.len() < CAPABILITY_MIN_MEASUREMENTS {
        return Err(AnalysisError::InsufficientData {
            analysis: "Process capability",
            required: CAPABILITY_MIN_MEASUREMENTS,
            actual: values.len(),
        });
    }

    let specs = data.specifications();
    let Some((usl, lsl)) = specs.limits() else {
        return Err(AnalysisError::MissingSpecLimits {
            analysis: "Process capability",
            missing: specs.missing_limits().join(", ").to_uppercase(),
        });
    };
    if usl <= lsl {
        return Err(AnalysisError::InvalidSpecLimits { usl, lsl });
    }

    let mu = mean(values);
    let sigma = sample_std(values);
    if sigma == 0.0 {
        return Err(AnalysisError::ZeroVariation("Process capability"));
    }

    let tolerance = usl - lsl;
    let cp = tolerance / (6.0 * sigma);
    let cpu = (usl - mu) / (3.0 * sigma);
    let cpl = (mu - lsl) / (3.0 * sigma);
    let cpk = cpu.min(cpl);
    let sigma_level = cpk * 3.0;

    let z_usl = (usl - mu) / sigma;
    let z_lsl = (lsl - mu) / sigma;
    let defect_rate = (1.0 - normal_cdf(z_usl)) + normal_cdf(z_lsl);

    let grade = CapabilityGrade::from_cpk(cpk);

    let assessment = if cpk >= CAPABLE_CPK {
        Assessment::Capable
    } else if cpk >= 1.0 {
        Assessment::Marginal
    } else {
        Assessment::Incapable
    };

    let improvement_priority = if cpk < 1.0 {
        Priority::High
    } else if cpk < CAPABLE_CPK {
        Priority::Medium
    } else {
        Priority::Low
    };

    Ok(CapabilityReport {
        sample_size: values.len(),
        mean: mu,
        std_dev: sigma,
        usl,
        lsl,
        target: specs.target.unwrap_or((usl + lsl) / 2.0),
        tolerance,
        cp,
        cpu,
        cpl,
        cpk,
        sigma_level,
        z_usl,
        z_lsl,
        defect_rate,
        ppm: defect_rate * 1e6,
        grade,
        grade_description: grade.description(),
        is_capable: cpk >= CAPABLE_CPK,
        meets_6sigma: sigma_level >= 6.0,
        assessment,
        improvement_priority,
    })
}
