//! Entity types - structured quality facts extracted from text
//!
//! Every record is an immutable value: constructors derive the dependent
//! fields (frequencies, totals, sample size) and consumers only read them.

pub mod cause_effect;
pub mod defect;
pub mod metrics;
pub mod process;

use serde::{Deserialize, Serialize};

pub use cause_effect::{CauseCategory, CauseEffectData};
pub use defect::DefectData;
pub use metrics::{QualityMetrics, Trend};
pub use process::{ProcessData, Specifications};

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Decoded from the AI-extraction collaborator's payload
    AiExtraction,
    /// Built by the text pattern extractor
    RegexExtraction,
    /// Entered directly by the user
    ManualInput,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::AiExtraction => write!(f, "ai_extraction"),
            DataSource::RegexExtraction => write!(f, "regex_extraction"),
            DataSource::ManualInput => write!(f, "manual_input"),
        }
    }
}

/// The four kinds of structured data a tool can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    DefectData,
    ProcessData,
    CauseEffectData,
    QualityMetrics,
}

impl DataKind {
    /// All kinds, in extraction order
    pub const ALL: [DataKind; 4] = [
        DataKind::DefectData,
        DataKind::ProcessData,
        DataKind::CauseEffectData,
        DataKind::QualityMetrics,
    ];

    /// Human label ("defect data", "process data", ...)
    pub fn label(&self) -> &'static str {
        match self {
            DataKind::DefectData => "defect data",
            DataKind::ProcessData => "process data",
            DataKind::CauseEffectData => "cause-effect data",
            DataKind::QualityMetrics => "quality metrics",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::DefectData => write!(f, "defect_data"),
            DataKind::ProcessData => write!(f, "process_data"),
            DataKind::CauseEffectData => write!(f, "cause_effect_data"),
            DataKind::QualityMetrics => write!(f, "quality_metrics"),
        }
    }
}

impl std::str::FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "defect_data" | "defect" | "defects" => Ok(DataKind::DefectData),
            "process_data" | "process" => Ok(DataKind::ProcessData),
            "cause_effect_data" | "cause_effect" | "cause" => Ok(DataKind::CauseEffectData),
            "quality_metrics" | "metrics" => Ok(DataKind::QualityMetrics),
            _ => Err(format!(
                "Invalid data kind: {}. Use defect, process, cause, or metrics",
                s
            )),
        }
    }
}

/// One structured record of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Defect(DefectData),
    Process(ProcessData),
    CauseEffect(CauseEffectData),
    Metrics { metrics: Vec<QualityMetrics> },
}

impl Record {
    /// The data kind this record carries
    pub fn kind(&self) -> DataKind {
        match self {
            Record::Defect(_) => DataKind::DefectData,
            Record::Process(_) => DataKind::ProcessData,
            Record::CauseEffect(_) => DataKind::CauseEffectData,
            Record::Metrics { .. } => DataKind::QualityMetrics,
        }
    }

    /// Number of data points, as counted by the tool gate
    pub fn point_count(&self) -> usize {
        match self {
            Record::Defect(d) => d.point_count(),
            Record::Process(p) => p.point_count(),
            Record::CauseEffect(c) => c.point_count(),
            Record::Metrics { metrics } => metrics.len(),
        }
    }
}

/// Everything extracted from one piece of text, one optional slot per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defect_data: Option<DefectData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_data: Option<ProcessData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause_effect_data: Option<CauseEffectData>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quality_metrics: Vec<QualityMetrics>,
}

impl ExtractedData {
    /// True when no slot holds data
    pub fn is_empty(&self) -> bool {
        self.defect_data.is_none()
            && self.process_data.is_none()
            && self.cause_effect_data.is_none()
            && self.quality_metrics.is_empty()
    }

    /// Whether the slot for `kind` is filled
    pub fn has(&self, kind: DataKind) -> bool {
        match kind {
            DataKind::DefectData => self.defect_data.is_some(),
            DataKind::ProcessData => self.process_data.is_some(),
            DataKind::CauseEffectData => self.cause_effect_data.is_some(),
            DataKind::QualityMetrics => !self.quality_metrics.is_empty(),
        }
    }

    /// Clone the slot for `kind` out as a record
    pub fn record(&self, kind: DataKind) -> Option<Record> {
        match kind {
            DataKind::DefectData => self.defect_data.clone().map(Record::Defect),
            DataKind::ProcessData => self.process_data.clone().map(Record::Process),
            DataKind::CauseEffectData => self.cause_effect_data.clone().map(Record::CauseEffect),
            DataKind::QualityMetrics => {
                if self.quality_metrics.is_empty() {
                    None
                } else {
                    Some(Record::Metrics {
                        metrics: self.quality_metrics.clone(),
                    })
                }
            }
        }
    }

    /// Kinds that currently hold data
    pub fn kinds(&self) -> Vec<DataKind> {
        DataKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }
}

impl From<Record> for ExtractedData {
    fn from(record: Record) -> Self {
        let mut data = ExtractedData::default();
        match record {
            Record::Defect(d) => data.defect_data = Some(d),
            Record::Process(p) => data.process_data = Some(p),
            Record::CauseEffect(c) => data.cause_effect_data = Some(c),
            Record::Metrics { metrics } => data.quality_metrics = metrics,
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_serialization() {
        let json = serde_json::to_string(&DataSource::RegexExtraction).unwrap();
        assert_eq!(json, "\"regex_extraction\"");
        assert_eq!(DataSource::AiExtraction.to_string(), "ai_extraction");
    }

    #[test]
    fn test_data_kind_from_str() {
        assert_eq!("defect".parse::<DataKind>().unwrap(), DataKind::DefectData);
        assert_eq!(
            "CAUSE_EFFECT_DATA".parse::<DataKind>().unwrap(),
            DataKind::CauseEffectData
        );
        assert!("bogus".parse::<DataKind>().is_err());
    }

    #[test]
    fn test_extracted_data_slots() {
        let mut data = ExtractedData::default();
        assert!(data.is_empty());
        assert!(data.record(DataKind::DefectData).is_none());

        data.defect_data = Some(DefectData::from_pairs(
            vec![("Scratch".to_string(), 4), ("Dent".to_string(), 2)],
            DataSource::ManualInput,
        ));
        assert!(!data.is_empty());
        assert_eq!(data.kinds(), vec![DataKind::DefectData]);

        let record = data.record(DataKind::DefectData).unwrap();
        assert_eq!(record.kind(), DataKind::DefectData);
        assert_eq!(record.point_count(), 2);
    }
}
