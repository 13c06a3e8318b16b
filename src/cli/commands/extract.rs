//! `tqa extract` command - pattern extraction with validation

use clap::ValueEnum;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{print_structured, resolve_format};
use crate::cli::output::{print_record, print_validation};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::entities::{DataKind, ExtractedData};
use crate::extract::{ExtractionError, PatternExtractor};
use crate::validation::{Validate, ValidationReport};

#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Text to extract from
    pub text: String,

    /// Only extract this kind of data
    #[arg(long, short = 'k', value_enum, default_value = "all")]
    pub kind: KindFilter,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindFilter {
    Defect,
    Process,
    Cause,
    Metrics,
    All,
}

impl KindFilter {
    fn includes(self, kind: DataKind) -> bool {
        match self {
            KindFilter::Defect => kind == DataKind::DefectData,
            KindFilter::Process => kind == DataKind::ProcessData,
            KindFilter::Cause => kind == DataKind::CauseEffectData,
            KindFilter::Metrics => kind == DataKind::QualityMetrics,
            KindFilter::All => true,
        }
    }
}

#[derive(Debug, Serialize)]
struct KindValidation {
    kind: DataKind,
    #[serde(flatten)]
    report: ValidationReport,
}

#[derive(Debug, Serialize)]
struct ExtractOutput {
    data: ExtractedData,
    validation: Vec<KindValidation>,
}

pub fn run(args: ExtractArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let data = filter(extract(&args.text), args.kind);

    if data.is_empty() {
        return Err(match args.kind {
            KindFilter::Defect => ExtractionError::no_data_of(DataKind::DefectData),
            KindFilter::Process => ExtractionError::no_data_of(DataKind::ProcessData),
            KindFilter::Cause => ExtractionError::no_data_of(DataKind::CauseEffectData),
            KindFilter::Metrics => ExtractionError::no_data_of(DataKind::QualityMetrics),
            KindFilter::All => ExtractionError::NoStructuredData,
        }
        .into());
    }

    let validation: Vec<KindValidation> = data
        .kinds()
        .into_iter()
        .filter_map(|kind| data.record(kind))
        .map(|record| KindValidation {
            kind: record.kind(),
            report: record.validate(),
        })
        .collect();

    let output = ExtractOutput { data, validation };
    if print_structured(&output, resolve_format(global, &config))? {
        return Ok(());
    }

    for item in &output.validation {
        if let Some(record) = output.data.record(item.kind) {
            print_record(&record);
        }
        let marker = if item.report.is_valid {
            style("valid").green()
        } else {
            style("invalid").red()
        };
        println!("   {}", marker);
        print_validation(&item.report);
        println!();
    }

    Ok(())
}

/// Pattern extraction with the same clean-up the pipeline applies
fn extract(text: &str) -> ExtractedData {
    let mut data = PatternExtractor::new().extract_all(text);
    data.defect_data = data
        .defect_data
        .map(|d| d.normalized())
        .filter(|d| d.point_count() > 0);
    data.process_data = data
        .process_data
        .map(|p| p.normalized())
        .filter(|p| p.point_count() > 0);
    data
}

fn filter(mut data: ExtractedData, kind: KindFilter) -> ExtractedData {
    if !kind.includes(DataKind::DefectData) {
        data.defect_data = None;
    }
    if !kind.includes(DataKind::ProcessData) {
        data.process_data = None;
    }
    if !kind.includes(DataKind::CauseEffectData) {
        data.cause_effect_data = None;
    }
    if !kind.includes(DataKind::QualityMetrics) {
        data.quality_metrics.clear();
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_requested_kind() {
        let data = extract("Scratch 15, Dent 8. Problem: leaks");
        assert!(data.defect_data.is_some());

        let only_cause = filter(data, KindFilter::Cause);
        assert_eq!(only_cause.kinds(), vec![DataKind::CauseEffectData]);
    }
}
