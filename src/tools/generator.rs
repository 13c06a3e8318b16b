//! Tool generation: record in, engine report out

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::registry::ToolId;
use crate::analysis::{
    analyze_capability, analyze_causes, analyze_control_chart, analyze_distribution,
    analyze_pareto, AnalysisError, CapabilityReport, CauseReport, ControlChartReport, ControlMode,
    DistributionReport, ParetoReport,
};
use crate::analysis::control_chart::DEFAULT_SUBGROUP_SIZE;
use crate::entities::Record;

/// Engine output for one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolReport {
    ParetoChart(ParetoReport),
    FishboneDiagram(CauseReport),
    ControlChart(ControlChartReport),
    Histogram(DistributionReport),
    ProcessCapability(CapabilityReport),
}

impl ToolReport {
    pub fn tool(&self) -> ToolId {
        match self {
            ToolReport::ParetoChart(_) => ToolId::ParetoChart,
            ToolReport::FishboneDiagram(_) => ToolId::FishboneDiagram,
            ToolReport::ControlChart(_) => ToolId::ControlChart,
            ToolReport::Histogram(_) => ToolId::Histogram,
            ToolReport::ProcessCapability(_) => ToolId::ProcessCapability,
        }
    }
}

/// Engine settings that are not part of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub subgroup_size: usize,
    pub control_mode: ControlMode,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            subgroup_size: DEFAULT_SUBGROUP_SIZE,
            control_mode: ControlMode::XbarR,
        }
    }
}

/// Run the engine behind `tool` on `record`
pub fn generate(
    tool: ToolId,
    record: &Record,
    options: &GeneratorOptions,
) -> Result<ToolReport, AnalysisError> {
    let spec = tool.spec();
    let report = match (tool, record) {
        (ToolId::ParetoChart, Record::Defect(data)) => ToolReport::ParetoChart(analyze_pareto(data)?),
        (ToolId::FishboneDiagram, Record::CauseEffect(data)) => {
            ToolReport::FishboneDiagram(analyze_causes(data))
        }
        (ToolId::ControlChart, Record::Process(data)) => ToolReport::ControlChart(
            analyze_control_chart(data, options.control_mode, options.subgroup_size)?,
        ),
        (ToolId::Histogram, Record::Process(data)) => {
            ToolReport::Histogram(analyze_distribution(data)?)
        }
        (ToolId::ProcessCapability, Record::Process(data)) => {
            ToolReport::ProcessCapability(analyze_capability(data)?)
        }
        _ => {
            return Err(AnalysisError::WrongDataKind {
                tool: spec.name,
                required: spec.required_data,
                found: record.kind(),
            })
        }
    };

    info!(tool = %tool, points = record.point_count(), "generated {}", spec.name);
    Ok(report)
}

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("Chart rendering failed: {0}")]
    #[diagnostic(code(tqa::render::failed))]
    Failed(String),

    #[error("No renderer for {0}")]
    #[diagnostic(code(tqa::render::unsupported))]
    Unsupported(ToolId),
}

/// Turns a computed report into image bytes
pub trait ChartRenderer: Send + Sync {
    fn render(&self, report: &ToolReport, record: &Record) -> Result<Vec<u8>, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DataKind, DataSource, DefectData, ProcessData, Specifications};

    fn defects() -> Record {
        Record::Defect(DefectData::from_pairs(
            vec![
                ("Scratch".to_string(), 50),
                ("Dent".to_string(), 30),
                ("Burr".to_string(), 20),
            ],
            DataSource::ManualInput,
        ))
    }

    fn series(n: usize) -> Record {
        let values = (0..n).map(|i| 10.0 + (i % 5) as f64 * 0.1).collect();
        Record::Process(ProcessData::new(
            values,
            Specifications::with_limits(11.0, 9.0),
            DataSource::ManualInput,
        ))
    }

    #[test]
    fn test_dispatches_to_matching_engine() {
        let options = GeneratorOptions::default();

        let report = generate(ToolId::ParetoChart, &defects(), &options).unwrap();
        assert_eq!(report.tool(), ToolId::ParetoChart);

        let report = generate(ToolId::ControlChart, &series(20), &options).unwrap();
        match report {
            ToolReport::ControlChart(chart) => {
                assert_eq!(chart.mode, ControlMode::XbarR);
                assert_eq!(chart.points.len(), 4);
            }
            other => panic!("unexpected report {:?}", other.tool()),
        }

        let report = generate(ToolId::Histogram, &series(20), &options).unwrap();
        assert_eq!(report.tool(), ToolId::Histogram);
    }

    #[test]
    fn test_individuals_option() {
        let options = GeneratorOptions {
            control_mode: ControlMode::Individuals,
            ..Default::default()
        };
        match generate(ToolId::ControlChart, &series(20), &options).unwrap() {
            ToolReport::ControlChart(chart) => assert_eq!(chart.points.len(), 20),
            other => panic!("unexpected report {:?}", other.tool()),
        }
    }

    #[test]
    fn test_wrong_record_kind() {
        let err = generate(ToolId::Histogram, &defects(), &GeneratorOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::WrongDataKind {
                required: DataKind::ProcessData,
                found: DataKind::DefectData,
                ..
            }
        ));
    }

    #[test]
    fn test_report_is_tagged_by_tool() {
        let report = generate(ToolId::ParetoChart, &defects(), &GeneratorOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tool"], "pareto_chart");
        assert_eq!(json["total_defects"], 100);
    }
}
