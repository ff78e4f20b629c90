//! Distribution result
//!
//! The output of one `calculate_distribution` call. A result is built fresh per
//! exit value and never mutated after it is returned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payout to a single share class at one exit value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPayout {
    /// Share class name
    pub name: String,

    /// Paid from the preference phase (cents)
    pub preference: i64,

    /// Paid from the participation / residual phase (cents)
    pub participation: i64,

    /// preference + participation (cents)
    pub total: i64,

    /// Class gave up its preference and was paid as common
    pub converted: bool,

    /// Class hit its participation cap
    pub capped: bool,
}

/// How one convertible non-participating class decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionDecision {
    /// Share class name
    pub name: String,

    /// Payout keeping the preference, all other classes at baseline (cents)
    pub preference_payout: i64,

    /// Payout converting alone, all other classes at baseline (cents)
    pub converted_payout: i64,

    /// Final choice after joint settlement
    pub converted: bool,
}

/// Complete allocation of one exit value across a cap table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionResult {
    /// Proceeds distributed (cents)
    pub exit_value: i64,

    /// One entry per share class, cap-table order
    pub payouts: Vec<ClassPayout>,

    /// Proceeds no class could absorb (cents); zero whenever an uncapped
    /// participant exists
    pub unallocated: i64,

    /// One entry per class that had a conversion choice
    pub conversions: Vec<ConversionDecision>,
}

impl DistributionResult {
    /// Total payout for a class, or `None` if the name is unknown
    pub fn payout(&self, name: &str) -> Option<i64> {
        self.class_payout(name).map(|p| p.total)
    }

    /// Full payout breakdown for a class
    pub fn class_payout(&self, name: &str) -> Option<&ClassPayout> {
        self.payouts.iter().find(|p| p.name == name)
    }

    /// Whether a class converted to common at this exit value
    pub fn is_converted(&self, name: &str) -> bool {
        self.class_payout(name).map(|p| p.converted).unwrap_or(false)
    }

    /// Whether a class hit its participation cap at this exit value
    pub fn is_capped(&self, name: &str) -> bool {
        self.class_payout(name).map(|p| p.capped).unwrap_or(false)
    }

    /// Sum of every class payout (cents)
    pub fn total_allocated(&self) -> i64 {
        self.payouts.iter().map(|p| p.total).sum()
    }

    /// Names of classes that converted
    pub fn converted_classes(&self) -> Vec<&str> {
        self.payouts
            .iter()
            .filter(|p| p.converted)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Class name → total payout
    pub fn to_map(&self) -> BTreeMap<String, i64> {
        self.payouts
            .iter()
            .map(|p| (p.name.clone(), p.total))
            .collect()
    }
}
