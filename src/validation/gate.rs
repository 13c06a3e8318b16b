//! Tool-specific gate: does a record carry enough to build a given tool?

use super::{Validate, ValidationError, ValidationReport};
use crate::entities::Record;
use crate::tools::{ToolId, ToolSpec};

/// Check `record` against a tool's requirements.
///
/// Fails on the wrong data kind, on fewer data points than the tool's
/// minimum, on a hard-invalid record, and for capability analysis on missing
/// or inverted specification limits. Advisory findings come back in the report.
pub fn validate_for_tool(
    record: &Record,
    tool: &ToolSpec,
) -> Result<ValidationReport, ValidationError> {
    if record.kind() != tool.required_data {
        return Err(ValidationError::WrongKind {
            tool: tool.name,
            required: tool.required_data,
            found: record.kind(),
        });
    }

    let actual = record.point_count();
    if actual < tool.min_data_points {
        return Err(ValidationError::InsufficientData {
            tool: tool.name,
            unit: tool.point_unit(),
            required: tool.min_data_points,
            actual,
            help: shortfall_help(record, tool),
        });
    }

    let mut report = record.validate().into_result(record.kind())?;

    if let Record::Process(process) = record {
        let specs = process.specifications();
        if tool.id == ToolId::ProcessCapability {
            let missing = specs.missing_limits();
            if !missing.is_empty() {
                return Err(ValidationError::MissingSpecLimits {
                    tool: tool.name,
                    missing: missing.join(", ").to_uppercase(),
                });
            }
            if let Some((usl, lsl)) = specs.limits() {
                if usl <= lsl {
                    return Err(ValidationError::InvalidSpecLimits {
                        tool: tool.name,
                        usl,
                        lsl,
                    });
                }
            }
        } else if specs.is_empty() && !report.warnings.iter().any(|w| w.contains("specification")) {
            report.warning("Specification limits not provided");
        }
    }

    Ok(report)
}

fn shortfall_help(record: &Record, tool: &ToolSpec) -> Option<String> {
    let mut lines = vec![format!(
        "Provide at least {} {} for a {}",
        tool.min_data_points,
        tool.point_unit(),
        tool.name
    )];

    if let Record::Process(process) = record {
        let missing = process.specifications().missing_limits();
        if tool.id == ToolId::ProcessCapability && !missing.is_empty() {
            lines.push(format!(
                "Specification limits are also missing: {}",
                missing.join(", ").to_uppercase()
            ));
        }
    }

    Some(lines.join("\n"))
}
