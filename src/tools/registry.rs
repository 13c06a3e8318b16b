//! Fixed table of generatable quality tools

use serde::{Deserialize, Serialize};

use crate::entities::DataKind;

/// Identifier of a quality tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    ParetoChart,
    FishboneDiagram,
    ControlChart,
    Histogram,
    ProcessCapability,
}

impl ToolId {
    /// All tools, in table order
    pub const ALL: [ToolId; 5] = [
        ToolId::ParetoChart,
        ToolId::FishboneDiagram,
        ToolId::ControlChart,
        ToolId::Histogram,
        ToolId::ProcessCapability,
    ];

    /// The table entry for this tool
    pub fn spec(&self) -> &'static ToolSpec {
        match self {
            ToolId::ParetoChart => &TOOLS[0],
            ToolId::FishboneDiagram => &TOOLS[1],
            ToolId::ControlChart => &TOOLS[2],
            ToolId::Histogram => &TOOLS[3],
            ToolId::ProcessCapability => &TOOLS[4],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::ParetoChart => "pareto_chart",
            ToolId::FishboneDiagram => "fishbone_diagram",
            ToolId::ControlChart => "control_chart",
            ToolId::Histogram => "histogram",
            ToolId::ProcessCapability => "process_capability",
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pareto_chart" | "pareto" => Ok(ToolId::ParetoChart),
            "fishbone_diagram" | "fishbone" | "ishikawa" => Ok(ToolId::FishboneDiagram),
            "control_chart" | "control" => Ok(ToolId::ControlChart),
            "histogram" => Ok(ToolId::Histogram),
            "process_capability" | "capability" => Ok(ToolId::ProcessCapability),
            _ => Err(format!(
                "Invalid tool: {}. Use pareto, fishbone, control, histogram, or capability",
                s
            )),
        }
    }
}

/// One row of the tool table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub id: ToolId,
    /// Display name
    pub name: &'static str,
    /// Usage guidance
    pub when_to_use: &'static str,
    pub can_generate: bool,
    pub required_data: DataKind,
    pub min_data_points: usize,
    /// Phrases the recommender compares queries against
    #[serde(skip)]
    pub descriptions: &'static [&'static str],
}

impl ToolSpec {
    /// What a data point is for this tool, in plural
    pub fn point_unit(&self) -> &'static str {
        match self.required_data {
            DataKind::DefectData => "defect categories",
            DataKind::ProcessData => "measurement points",
            DataKind::CauseEffectData => "cause categories",
            DataKind::QualityMetrics => "metrics",
        }
    }
}

pub static TOOLS: [ToolSpec; 5] = [
    ToolSpec {
        id: ToolId::ParetoChart,
        name: "Pareto Chart",
        when_to_use: "Use when you want to prioritize issues based on how often they occur.",
        can_generate: true,
        required_data: DataKind::DefectData,
        min_data_points: 3,
        descriptions: &[
            "analyze frequency of defects",
            "identify most common problems",
            "prioritize quality issues",
            "find frequent failures",
            "count occurrence of problems",
            "generate pareto chart",
            "create pareto analysis",
            "build pareto diagram",
        ],
    },
    ToolSpec {
        id: ToolId::FishboneDiagram,
        name: "Fishbone Diagram",
        when_to_use: "Use when you need to analyze the underlying causes of a problem.",
        can_generate: true,
        required_data: DataKind::CauseEffectData,
        min_data_points: 2,
        descriptions: &[
            "find root cause of issue",
            "analyze why problem occurs",
            "determine cause and effect",
            "investigate problem source",
            "diagnose underlying issues",
            "create fishbone diagram",
            "build cause and effect diagram",
            "generate ishikawa diagram",
        ],
    },
    ToolSpec {
        id: ToolId::ControlChart,
        name: "Control Chart",
        when_to_use: "Use to monitor process variation over time.",
        can_generate: true,
        required_data: DataKind::ProcessData,
        min_data_points: 20,
        descriptions: &[
            "track process variation",
            "monitor quality metrics",
            "analyze trends over time",
            "detect process shifts",
            "identify out of control conditions",
            "generate control chart",
            "create control chart",
            "build control chart",
        ],
    },
    ToolSpec {
        id: ToolId::Histogram,
        name: "Histogram",
        when_to_use: "Use to understand the distribution and spread of measurement data.",
        can_generate: true,
        required_data: DataKind::ProcessData,
        min_data_points: 10,
        descriptions: &[
            "analyze data distribution",
            "check measurement spread",
            "visualize process output",
            "examine data patterns",
            "assess normal distribution",
            "generate histogram",
            "create histogram",
            "build histogram",
        ],
    },
    ToolSpec {
        id: ToolId::ProcessCapability,
        name: "Process Capability Analysis",
        when_to_use: "Use when evaluating how well a process meets specification limits.",
        can_generate: true,
        required_data: DataKind::ProcessData,
        min_data_points: 30,
        descriptions: &[
            "measure process capability",
            "check specification limits",
            "analyze process performance",
            "evaluate manufacturing capability",
            "assess process variation",
            "generate capability analysis",
            "create cp cpk chart",
            "build process capability chart",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_table() {
        let expected = [
            ("pareto_chart", DataKind::DefectData, 3),
            ("fishbone_diagram", DataKind::CauseEffectData, 2),
            ("control_chart", DataKind::ProcessData, 20),
            ("histogram", DataKind::ProcessData, 10),
            ("process_capability", DataKind::ProcessData, 30),
        ];

        for (id, (name, kind, min)) in ToolId::ALL.iter().zip(expected) {
            let spec = id.spec();
            assert_eq!(spec.id, *id);
            assert_eq!(id.as_str(), name);
            assert_eq!(spec.required_data, kind);
            assert_eq!(spec.min_data_points, min);
            assert!(spec.can_generate);
            assert_eq!(spec.descriptions.len(), 8);
        }
    }

    #[test]
    fn test_tool_id_parse() {
        assert_eq!("pareto".parse::<ToolId>().unwrap(), ToolId::ParetoChart);
        assert_eq!(
            "Process-Capability".parse::<ToolId>().unwrap(),
            ToolId::ProcessCapability
        );
        assert!("scatter".parse::<ToolId>().is_err());
    }
}
