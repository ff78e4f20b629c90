//! Report export
//!
//! Bundles the distributions of a batch of exit values with the cap table that
//! produced them, tagged with the cap table's SHA256 fingerprint so a report
//! can be traced back to its exact input.

use serde::{Deserialize, Serialize};

use super::engine::{WaterfallEngine, WaterfallError};
use crate::models::{DistributionResult, PreferenceType};

/// Cap-table row as it appears in an exported report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub name: String,
    pub priority: i32,
    pub shares: u64,
    pub invested: i64,
    pub preference_type: PreferenceType,
    pub preference_multiple: f64,
    pub participation_cap: Option<f64>,
    pub liquidation_preference: i64,
    pub ownership: f64,
}

/// Distribution or failure for one exit value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportEntry {
    Ok { result: DistributionResult },
    Error { exit_value: i64, message: String },
}

/// Serializable batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallReport {
    /// SHA256 fingerprint of the cap table
    pub cap_table_fingerprint: String,

    /// Cap table rows, cap-table order
    pub classes: Vec<ClassSummary>,

    /// One entry per requested exit value, request order
    pub results: Vec<ReportEntry>,
}

impl WaterfallReport {
    /// Evaluate `exit_values` and collect everything into one report
    ///
    /// A failing exit value becomes an `Error` entry; the rest still run.
    pub fn build(engine: &WaterfallEngine, exit_values: &[i64]) -> Self {
        let cap_table = engine.cap_table();

        let classes = cap_table
            .classes()
            .iter()
            .enumerate()
            .map(|(i, c)| ClassSummary {
                name: c.name().to_string(),
                priority: c.priority(),
                shares: c.shares(),
                invested: c.invested(),
                preference_type: c.preference_type(),
                preference_multiple: c.preference_multiple(),
                participation_cap: c.participation_cap(),
                liquidation_preference: c.liquidation_preference(),
                ownership: cap_table.ownership(i),
            })
            .collect();

        let results = exit_values
            .iter()
            .zip(engine.calculate_batch(exit_values))
            .map(|(&exit_value, outcome)| match outcome {
                Ok(result) => ReportEntry::Ok { result },
                Err(e) => ReportEntry::Error {
                    exit_value,
                    message: e.to_string(),
                },
            })
            .collect();

        Self {
            cap_table_fingerprint: cap_table.fingerprint(),
            classes,
            results,
        }
    }

    /// Successful distributions only
    pub fn distributions(&self) -> impl Iterator<Item = &DistributionResult> {
        self.results.iter().filter_map(|entry| match entry {
            ReportEntry::Ok { result } => Some(result),
            ReportEntry::Error { .. } => None,
        })
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check this report was produced from the engine's cap table
    pub fn matches(&self, engine: &WaterfallEngine) -> bool {
        self.cap_table_fingerprint == engine.cap_table().fingerprint()
    }
}

/// Convenience for callers that want the first failure instead of per-entry errors
pub fn collect_batch(
    engine: &WaterfallEngine,
    exit_values: &[i64],
) -> Result<Vec<DistributionResult>, WaterfallError> {
    engine.calculate_batch(exit_values).into_iter().collect()
}
