//! Human-readable rendering of records and reports

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::analysis::{
    CapabilityReport, CauseReport, ControlChartReport, DistributionReport, ParetoReport,
};
use crate::cli::helpers::{format_opt, truncate_str};
use crate::entities::{ExtractedData, Record, Specifications};
use crate::tools::ToolReport;
use crate::validation::ValidationReport;

pub fn print_tool_report(report: &ToolReport) {
    match report {
        ToolReport::ParetoChart(r) => print_pareto(r),
        ToolReport::FishboneDiagram(r) => print_causes(r),
        ToolReport::ControlChart(r) => print_control_chart(r),
        ToolReport::Histogram(r) => print_distribution(r),
        ToolReport::ProcessCapability(r) => print_capability(r),
    }
}

/// Markdown Pareto table
pub fn pareto_table(report: &ParetoReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Rank", "Category", "Count", "%", "Cum %", "Class"]);
    for entry in &report.entries {
        builder.push_record([
            entry.rank.to_string(),
            truncate_str(&entry.category, 32),
            entry.count.to_string(),
            format!("{:.1}", entry.percentage),
            format!("{:.1}", entry.cumulative_percentage),
            entry.class.to_string(),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}

fn print_pareto(report: &ParetoReport) {
    println!("{}", style("Pareto Chart").bold().underlined());
    println!();
    println!("{}", pareto_table(report));
    println!();
    println!("   Total defects: {}", style(report.total_defects).cyan());
    println!(
        "   Top category: {} ({}, {:.1}%)",
        style(&report.top_category).yellow(),
        report.top_category_count,
        report.top_category_percentage
    );
    println!(
        "   Vital few: {} categories cover {:.1}%",
        report.pareto_80_categories, report.pareto_80_percentage
    );
    println!(
        "   Top 3: {} ({:.1}%)",
        report.top_3_categories.join(", "),
        report.top_3_percentage
    );
    println!("   Pareto effectiveness: {}", report.effectiveness);
    if let Some(period) = &report.time_period {
        println!("   Period: {}", period);
    }
}

fn print_causes(report: &CauseReport) {
    println!("{}", style("Fishbone Diagram").bold().underlined());
    println!();
    println!("   Problem: {}", style(&report.problem).yellow());
    for item in report.breakdown.iter().filter(|b| b.count > 0) {
        println!("   {} ({})", style(item.category).bold(), item.count);
        for cause in &item.causes {
            println!("     - {}", cause);
        }
    }
    if !report.unscored_categories.is_empty() {
        println!(
            "   {} {}",
            style("Other categories:").dim(),
            report.unscored_categories.join(", ")
        );
    }
    println!();
    println!("   Sub-causes: {}", report.total_sub_causes);
    println!("   Completeness: {}", report.analysis_completeness);
    println!("   Diversity: {}", report.cause_diversity);
    println!("   Root cause status: {}", report.root_cause_status);
}

fn print_control_chart(report: &ControlChartReport) {
    println!(
        "{}",
        style(format!("Control Chart ({})", report.mode)).bold().underlined()
    );
    println!();
    if let Some(size) = report.subgroup_size {
        println!("   Subgroup size: {} ({} points)", size, report.points.len());
    }
    println!("   Center line: {:.4}", report.center_line);
    println!("   UCL: {:.4}", report.ucl);
    println!("   LCL: {:.4}", report.lcl);
    println!(
        "   Range: mean {:.4}, UCL {:.4}, LCL {:.4}",
        report.mean_range, report.range_ucl, report.range_lcl
    );
    if report.discarded > 0 {
        println!(
            "   {} {} trailing measurements did not fill a subgroup",
            style("!").yellow(),
            report.discarded
        );
    }
    print_specifications(&report.specifications);

    if report.is_stable() {
        println!("   Status: {}", style("in control").green());
    } else {
        println!(
            "   Status: {} ({} points at {:?})",
            style("out of control").red(),
            report.out_of_control_count(),
            report.out_of_control
        );
    }
    if !report.range_out_of_control.is_empty() {
        println!("   Range signals at {:?}", report.range_out_of_control);
    }
}

fn print_distribution(report: &DistributionReport) {
    println!("{}", style("Histogram").bold().underlined());
    println!();
    println!(
        "   n = {}, mean = {:.4}, std dev = {:.4}",
        report.sample_size, report.mean, report.std_dev
    );
    println!(
        "   median = {:.4}, mode = {}, range = {:.4} ({:.4} to {:.4})",
        report.median,
        format_opt(report.mode, 4),
        report.range,
        report.min,
        report.max
    );
    println!(
        "   skewness = {}, kurtosis = {}",
        format_opt(report.skewness, 3),
        format_opt(report.kurtosis, 3)
    );
    match &report.normality {
        Some(test) => println!(
            "   Shapiro-Wilk W = {:.4}, p = {:.4} ({})",
            test.statistic,
            test.p_value,
            if test.is_normal() { "normal" } else { "not normal" }
        ),
        None => println!("   Normality: {}", style("not tested").dim()),
    }
    if report.outliers_detected {
        println!(
            "   {} outliers at {:?}",
            style("!").yellow(),
            report.outlier_indices
        );
    }
    print_specifications(&report.specifications);

    println!();
    let peak = report.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bin in &report.bins {
        let bar = "#".repeat((bin.count * 40).div_ceil(peak));
        println!(
            "   {:>10.4} - {:<10.4} {:>4} {}",
            bin.lower, bin.upper, bin.count, bar
        );
    }
}

fn print_capability(report: &CapabilityReport) {
    println!("{}", style("Process Capability Analysis").bold().underlined());
    println!();
    println!(
        "   n = {}, mean = {:.4}, std dev = {:.4}",
        report.sample_size, report.mean, report.std_dev
    );
    println!(
        "   LSL = {:.4}, target = {:.4}, USL = {:.4}",
        report.lsl, report.target, report.usl
    );
    println!(
        "   Cp = {:.3}, Cpk = {:.3} (Cpu {:.3}, Cpl {:.3})",
        report.cp, report.cpk, report.cpu, report.cpl
    );
    println!("   Sigma level: {:.2}", report.sigma_level);
    println!("   Expected PPM: {:.1}", report.ppm);

    let grade = format!("{} ({})", report.grade, report.grade_description);
    let grade = if report.is_capable {
        style(grade).green()
    } else {
        style(grade).red()
    };
    println!("   Grade: {}", grade);
    println!(
        "   Assessment: {}, improvement priority: {}",
        report.assessment, report.improvement_priority
    );
}

fn print_specifications(specs: &Specifications) {
    if specs.is_empty() {
        return;
    }
    println!(
        "   Specs: LSL {}, target {}, USL {}",
        format_opt(specs.lsl, 4),
        format_opt(specs.target, 4),
        format_opt(specs.usl, 4)
    );
}

pub fn print_validation(report: &ValidationReport) {
    for error in &report.errors {
        println!("   {} {}", style("✗").red(), error);
    }
    for warning in &report.warnings {
        println!("   {} {}", style("!").yellow(), warning);
    }
    for suggestion in &report.suggestions {
        println!("   {} {}", style("→").dim(), suggestion);
    }
}

pub fn print_record(record: &Record) {
    match record {
        Record::Defect(d) => {
            println!("{} ({} total)", style("Defect data").bold(), d.total_defects());
            for (category, count, frequency) in d.entries() {
                println!("   {:<32} {:>6} {:>6.1}%", category, count, frequency * 100.0);
            }
        }
        Record::Process(p) => {
            println!(
                "{} ({} measurements)",
                style("Process data").bold(),
                p.sample_size()
            );
            let values: Vec<String> = p.measurements().iter().map(|v| v.to_string()).collect();
            println!("   {}", truncate_str(&values.join(", "), 72));
            print_specifications(p.specifications());
        }
        Record::CauseEffect(c) => {
            println!("{}", style("Cause-effect data").bold());
            println!("   Problem: {}", c.problem());
            for category in c.main_categories() {
                println!("   {}: {}", category, c.causes_for(category).join(", "));
            }
        }
        Record::Metrics { metrics } => {
            println!("{}", style("Quality metrics").bold());
            for metric in metrics {
                println!(
                    "   {} = {}{}",
                    metric.metric_name,
                    metric.value,
                    metric.unit.as_deref().unwrap_or("")
                );
            }
        }
    }
}

pub fn print_extracted(data: &ExtractedData) {
    for kind in data.kinds() {
        if let Some(record) = data.record(kind) {
            print_record(&record);
            println!();
        }
    }
}
