//! Keyword routing for explicit generation requests
//!
//! A request like "Create a Pareto chart: scratch 15, dent 8" names its tool
//! outright, but the data tokens pull its similarity under the threshold.
//! The checks run in a fixed order and the first hit wins.

use super::registry::ToolId;

/// The tool a query names, with the keyword that named it
pub fn detect_tool(query: &str) -> Option<(ToolId, &'static str)> {
    let text = query.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_word = |word: &str| words.contains(&word);

    if text.contains("pareto") {
        return Some((ToolId::ParetoChart, "pareto"));
    }
    if text.contains("control chart") || (has_word("control") && text.contains("chart")) {
        return Some((ToolId::ControlChart, "control chart"));
    }
    if text.contains("histogram") {
        return Some((ToolId::Histogram, "histogram"));
    }
    if text.contains("capability") {
        return Some((ToolId::ProcessCapability, "capability"));
    }
    if has_word("cpk") {
        return Some((ToolId::ProcessCapability, "cpk"));
    }
    if has_word("cp") {
        return Some((ToolId::ProcessCapability, "cp"));
    }
    if text.contains("fishbone") {
        return Some((ToolId::FishboneDiagram, "fishbone"));
    }
    if text.contains("root cause") {
        return Some((ToolId::FishboneDiagram, "root cause"));
    }
    if text.contains("cause") && text.contains("diagram") {
        return Some((ToolId::FishboneDiagram, "cause diagram"));
    }
    None
}
