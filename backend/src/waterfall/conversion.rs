//! Conversion evaluation
//!
//! A convertible non-participating class takes the better of two outcomes:
//! keep its preference, or give it up and share in the residual as common.
//! Comparing them means running the full waterfall twice.
//!
//! # Decision procedure
//!
//! 1. **Baseline**: every class takes its default treatment.
//! 2. **Independent test**: for each candidate `c`, run the waterfall with only
//!    `c` converted. `c` converts iff that payout is strictly greater than its
//!    baseline payout (ties keep the preference).
//! 3. **Joint settlement**: apply all winners together. If a converted class no
//!    longer does strictly better than it would by reverting (other conversions
//!    diluted it), the first such class in stack order reverts and the joint
//!    scenario is re-run. Each step works on a strictly smaller set, so the
//!    recursion depth is bounded by the number of candidates.
//!
//! Participating classes are never candidates: conversion would forfeit their
//! preference and gain nothing they do not already participate in.

use tracing::debug;

use super::scenario::{simulate, ConversionSet, ScenarioOutcome};
use super::InvariantViolation;
use crate::models::{CapTable, ConversionDecision};

/// Outcome of conversion evaluation at one exit value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    /// One entry per candidate class, cap-table order
    pub decisions: Vec<ConversionDecision>,

    /// Final set of converting classes
    pub conversions: ConversionSet,

    /// Waterfall under the final conversion set
    pub outcome: ScenarioOutcome,
}

/// Decide conversions and return the settled scenario
///
/// # Arguments
///
/// * `cap_table` - Validated cap table
/// * `exit_value` - Proceeds in cents (non-negative; checked by the caller)
pub fn evaluate_conversions(
    cap_table: &CapTable,
    exit_value: i64,
) -> Result<ConversionPlan, InvariantViolation> {
    let baseline = simulate(cap_table, exit_value, &ConversionSet::none())?;

    let candidates: Vec<usize> = cap_table
        .classes()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.can_elect_conversion())
        .map(|(i, _)| i)
        .collect();

    let mut independent: Vec<(usize, i64, i64)> = Vec::with_capacity(candidates.len());
    let mut winners = ConversionSet::none();

    for &index in &candidates {
        let preference_payout = baseline.total(index);
        let alone = simulate(cap_table, exit_value, &ConversionSet::none().with(index))?;
        let converted_payout = alone.total(index);

        if converted_payout > preference_payout {
            winners = winners.with(index);
        }

        debug!(
            class = cap_table.classes()[index].name(),
            exit_value,
            preference_payout,
            converted_payout,
            converts = converted_payout > preference_payout,
            "Conversion test"
        );

        independent.push((index, preference_payout, converted_payout));
    }

    let (conversions, outcome) = if winners.is_empty() {
        (winners, baseline)
    } else {
        let joint = simulate(cap_table, exit_value, &winners)?;
        settle_jointly(cap_table, exit_value, winners, joint)?
    };

    let decisions = independent
        .into_iter()
        .map(|(index, preference_payout, converted_payout)| ConversionDecision {
            name: cap_table.classes()[index].name().to_string(),
            preference_payout,
            converted_payout,
            converted: conversions.contains(index),
        })
        .collect();

    Ok(ConversionPlan {
        decisions,
        conversions,
        outcome,
    })
}

/// Revert converted classes that no longer benefit under the joint scenario
///
/// Recurses on a strictly smaller conversion set each time a class reverts.
fn settle_jointly(
    cap_table: &CapTable,
    exit_value: i64,
    conversions: ConversionSet,
    outcome: ScenarioOutcome,
) -> Result<(ConversionSet, ScenarioOutcome), InvariantViolation> {
    for index in stack_order(cap_table, &conversions) {
        let reverted = conversions.without(index);
        let kept = simulate(cap_table, exit_value, &reverted)?;

        if outcome.total(index) <= kept.total(index) {
            debug!(
                class = cap_table.classes()[index].name(),
                exit_value,
                converted_payout = outcome.total(index),
                preference_payout = kept.total(index),
                "Conversion reverted under joint settlement"
            );
            return settle_jointly(cap_table, exit_value, reverted, kept);
        }
    }

    Ok((conversions, outcome))
}

/// Members of `conversions`, highest priority first, cap-table order within a priority
fn stack_order(cap_table: &CapTable, conversions: &ConversionSet) -> Vec<usize> {
    let mut order: Vec<usize> = conversions.iter().collect();
    order.sort_by(|&a, &b| {
        let pa = cap_table.classes()[a].priority();
        let pb = cap_table.classes()[b].priority();
        pb.cmp(&pa).then(a.cmp(&b))
    });
    order
}
