//! JSON report: every distribution plus the cap table fingerprint

use anyhow::Result;
use waterfall_core_rs::orchestrator::ReportEntry;
use waterfall_core_rs::{WaterfallEngine, WaterfallReport};

pub fn render(engine: &WaterfallEngine, exit_values: &[i64]) -> Result<(String, WaterfallReport)> {
    let report = WaterfallReport::build(engine, exit_values);
    let json = serde_json::to_string_pretty(&report)?;
    Ok((json + "\n", report))
}

/// Error entries of a report as (exit value, message)
pub fn failures(report: &WaterfallReport) -> Vec<(i64, String)> {
    report
        .results
        .iter()
        .filter_map(|entry| match entry {
            ReportEntry::Error { exit_value, message } => Some((*exit_value, message.clone())),
            ReportEntry::Ok { .. } => None,
        })
        .collect()
}
