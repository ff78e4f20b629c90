//! Waterfall Components
//!
//! The pieces the engine composes, leaf first:
//! - **grouping**: partition classes into priority groups, descending
//! - **preference**: pay preference claims group by group, pro-rata on shortfall
//! - **caps**: split the residual pool subject to participation caps
//! - **scenario**: one full waterfall for a fixed set of conversions
//! - **conversion**: decide which non-participating classes convert
//!
//! # Critical Invariants
//!
//! 1. **Conservation**: every scenario accounts for exactly the exit value
//!    (payouts + unallocated residual)
//! 2. **Caps**: no capped participating class receives more than its cap
//! 3. **Purity**: no component mutates the cap table or keeps state between calls

use thiserror::Error;

pub mod caps;
pub mod conversion;
pub mod grouping;
pub mod preference;
pub mod scenario;

// Re-export public API
pub use caps::{enforce_caps, CapOutcome, Participant};
pub use conversion::{evaluate_conversions, ConversionPlan};
pub use grouping::{group_by_priority, PriorityGroup};
pub use preference::{pay_preferences, PreferencePayout};
pub use scenario::{simulate, ConversionSet, ScenarioOutcome};

/// An internal consistency check failed
///
/// These indicate an engine defect, not bad input. They are never retried and
/// no partial result accompanies them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error(
        "Conservation violated at exit value {exit_value}: allocated {allocated} + unallocated {unallocated}"
    )]
    Conservation {
        exit_value: i64,
        allocated: i64,
        unallocated: i64,
    },

    #[error("Negative payout {amount} for share class '{name}'")]
    NegativePayout { name: String, amount: i64 },

    #[error("Share class '{name}' paid {payout}, above its cap {cap}")]
    CapExceeded { name: String, payout: i64, cap: i64 },

    #[error("Cap enforcement did not converge after {passes} passes")]
    CapLoopDidNotConverge { passes: usize },
}
