//! Waterfall Engine
//!
//! Orchestrates the waterfall components into one distribution per exit value:
//!
//! ```text
//! For each exit value V:
//! 1. Validate V >= 0
//! 2. Priority grouping + preference payment   (baseline scenario)
//! 3. Cap enforcement over the residual pool   (baseline scenario)
//! 4. Conversion evaluation                    (what-if scenarios, joint settlement)
//! 5. Merge into a DistributionResult
//! 6. Check conservation, non-negativity and caps before returning
//! ```
//!
//! # Configuration
//!
//! The engine holds a validated `CapTable` and nothing else. Every call takes
//! an exit value and returns a fresh result; no state survives between calls,
//! so batches can be evaluated on several threads at once.
//!
//! # Example
//!
//! ```rust
//! use waterfall_core_rs::{CapTable, PreferenceType, ShareClass, WaterfallEngine};
//!
//! let cap_table = CapTable::new(vec![
//!     ShareClass::preferred("Series A", 100_000, 100_000_000, PreferenceType::NonParticipating)
//!         .with_priority(1),
//!     ShareClass::common("Common", 900_000),
//! ])
//! .unwrap();
//!
//! let engine = WaterfallEngine::new(cap_table);
//!
//! // $15M exit: 10% as-converted ($1.5M) beats the $1M preference
//! let result = engine.calculate_distribution(1_500_000_000).unwrap();
//! assert!(result.is_converted("Series A"));
//! assert_eq!(result.payout("Series A"), Some(150_000_000));
//! assert_eq!(result.payout("Common"), Some(1_350_000_000));
//! ```

use std::thread;

use thiserror::Error;
use tracing::warn;

use crate::models::{CapTable, CapTableError, ClassPayout, DistributionResult};
use crate::waterfall::{evaluate_conversions, InvariantViolation};

/// Errors returned by a distribution call
#[derive(Debug, Error, PartialEq)]
pub enum WaterfallError {
    #[error("Exit value must not be negative (got {0} cents)")]
    NegativeExitValue(i64),

    #[error("Configuration error: {0}")]
    Configuration(#[from] CapTableError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}

/// Compute the distribution of `exit_value` cents across `cap_table`
///
/// Pure function: same inputs, same result, no side effects.
///
/// # Errors
///
/// - `NegativeExitValue` for `exit_value < 0`
/// - `InvariantViolation` if the computed result fails a consistency check
///   (engine defect; never returned for valid input)
pub fn calculate_distribution(
    cap_table: &CapTable,
    exit_value: i64,
) -> Result<DistributionResult, WaterfallError> {
    if exit_value < 0 {
        return Err(WaterfallError::NegativeExitValue(exit_value));
    }

    let plan = evaluate_conversions(cap_table, exit_value)?;
    let outcome = &plan.outcome;

    let payouts: Vec<ClassPayout> = cap_table
        .classes()
        .iter()
        .enumerate()
        .map(|(i, class)| ClassPayout {
            name: class.name().to_string(),
            preference: outcome.preference[i],
            participation: outcome.participation[i],
            total: outcome.total(i),
            converted: plan.conversions.contains(i),
            capped: outcome.capped[i],
        })
        .collect();

    if outcome.unallocated > 0 {
        warn!(
            exit_value,
            unallocated = outcome.unallocated,
            "No uncapped participant can absorb the residual pool"
        );
    }

    let result = DistributionResult {
        exit_value,
        payouts,
        unallocated: outcome.unallocated,
        conversions: plan.decisions,
    };

    check_invariants(cap_table, &result)?;
    Ok(result)
}

/// Verify a finished result before it leaves the engine
fn check_invariants(cap_table: &CapTable, result: &DistributionResult) -> Result<(), InvariantViolation> {
    for payout in &result.payouts {
        if payout.total < 0 || payout.preference < 0 || payout.participation < 0 {
            return Err(InvariantViolation::NegativePayout {
                name: payout.name.clone(),
                amount: payout.total.min(payout.preference).min(payout.participation),
            });
        }
    }

    for (class, payout) in cap_table.classes().iter().zip(&result.payouts) {
        if let Some(cap) = class.cap_amount() {
            if !payout.converted && payout.total > cap {
                return Err(InvariantViolation::CapExceeded {
                    name: payout.name.clone(),
                    payout: payout.total,
                    cap,
                });
            }
        }
    }

    let allocated = result.total_allocated();
    if result.unallocated < 0 || allocated + result.unallocated != result.exit_value {
        return Err(InvariantViolation::Conservation {
            exit_value: result.exit_value,
            allocated,
            unallocated: result.unallocated,
        });
    }

    Ok(())
}

// ============================================================================
// Engine
// ============================================================================

/// Waterfall calculator bound to one immutable cap table
///
/// Cheap to share: `&WaterfallEngine` is `Send + Sync`, and every method takes
/// `&self`.
#[derive(Debug, Clone)]
pub struct WaterfallEngine {
    cap_table: CapTable,
}

impl WaterfallEngine {
    /// Create an engine over a validated cap table
    pub fn new(cap_table: CapTable) -> Self {
        Self { cap_table }
    }

    /// The cap table this engine evaluates
    pub fn cap_table(&self) -> &CapTable {
        &self.cap_table
    }

    /// Distribution for a single exit value (cents)
    pub fn calculate_distribution(&self, exit_value: i64) -> Result<DistributionResult, WaterfallError> {
        calculate_distribution(&self.cap_table, exit_value)
    }

    /// Distributions for several exit values, in input order
    ///
    /// Each exit value is independent: one failure does not affect the others.
    pub fn calculate_batch(&self, exit_values: &[i64]) -> Vec<Result<DistributionResult, WaterfallError>> {
        exit_values
            .iter()
            .map(|&v| self.calculate_distribution(v))
            .collect()
    }

    /// Same as `calculate_batch`, spread over up to `workers` scoped threads
    ///
    /// Results come back in input order regardless of which thread ran them.
    pub fn calculate_batch_parallel(
        &self,
        exit_values: &[i64],
        workers: usize,
    ) -> Vec<Result<DistributionResult, WaterfallError>> {
        let workers = workers.max(1).min(exit_values.len().max(1));
        if workers == 1 {
            return self.calculate_batch(exit_values);
        }

        let chunk_size = exit_values.len().div_ceil(workers);
        thread::scope(|scope| {
            let handles: Vec<_> = exit_values
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.calculate_batch(chunk)))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PreferenceType, ShareClass};

    fn engine() -> WaterfallEngine {
        let cap_table = CapTable::new(vec![
            ShareClass::preferred("Series A", 100_000, 100_000_000, PreferenceType::NonParticipating)
                .with_priority(1),
            ShareClass::common("Common", 900_000),
        ])
        .unwrap();
        WaterfallEngine::new(cap_table)
    }

    #[test]
    fn test_negative_exit_value_rejected() {
        assert_eq!(
            engine().calculate_distribution(-1),
            Err(WaterfallError::NegativeExitValue(-1))
        );
    }

    #[test]
    fn test_zero_exit_value() {
        let result = engine().calculate_distribution(0).unwrap();
        assert!(result.payouts.iter().all(|p| p.total == 0));
        assert_eq!(result.unallocated, 0);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let results = engine().calculate_batch(&[500_000_000, -5, 1_500_000_000]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].as_ref().unwrap().is_converted("Series A"));
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let engine = engine();
        let values: Vec<i64> = (0..25).map(|i| i * 100_000_000).collect();
        let sequential = engine.calculate_batch(&values);
        let parallel = engine.calculate_batch_parallel(&values, 4);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_batch_empty_input() {
        assert!(engine().calculate_batch_parallel(&[], 8).is_empty());
    }

    #[test]
    fn test_check_invariants_detects_leak() {
        let engine = engine();
        let mut result = engine.calculate_distribution(500_000_000).unwrap();
        result.payouts[1].total -= 1;
        assert!(matches!(
            check_invariants(engine.cap_table(), &result),
            Err(InvariantViolation::Conservation { .. })
        ));
    }

    #[test]
    fn test_check_invariants_detects_cap_breach() {
        let cap_table = CapTable::new(vec![
            ShareClass::preferred("B", 100, 1_000, PreferenceType::Participating).with_cap(2.0),
            ShareClass::common("Common", 100),
        ])
        .unwrap();
        let mut result = calculate_distribution(&cap_table, 10_000).unwrap();
        result.payouts[0].total = 2_001;
        result.payouts[1].total = 7_999;
        assert!(matches!(
            check_invariants(&cap_table, &result),
            Err(InvariantViolation::CapExceeded { cap: 2_000, .. })
        ));
    }
}
