//! Batch evaluation shared by every output format

use std::thread;

use waterfall_core_rs::{DistributionResult, WaterfallEngine, WaterfallError};

/// Outcome of one requested exit value
#[derive(Debug)]
pub struct Column {
    pub exit_value: i64,
    pub outcome: Result<DistributionResult, WaterfallError>,
}

/// All requested exit values evaluated against one cap table
#[derive(Debug)]
pub struct Analysis {
    engine: WaterfallEngine,
    columns: Vec<Column>,
}

impl Analysis {
    /// Evaluate `exit_values` (cents) on the available cores
    pub fn run(engine: WaterfallEngine, exit_values: &[i64]) -> Self {
        let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let columns = exit_values
            .iter()
            .zip(engine.calculate_batch_parallel(exit_values, workers))
            .map(|(&exit_value, outcome)| Column { exit_value, outcome })
            .collect();

        Self { engine, columns }
    }

    pub fn engine(&self) -> &WaterfallEngine {
        &self.engine
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Exit values that failed, with their error messages
    pub fn failures(&self) -> Vec<(i64, String)> {
        self.columns
            .iter()
            .filter_map(|c| match &c.outcome {
                Ok(_) => None,
                Err(e) => Some((c.exit_value, e.to_string())),
            })
            .collect()
    }
}
