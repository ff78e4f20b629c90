//! Single-scenario waterfall
//!
//! Runs the preference phase and the participation phase for one fixed set of
//! converting classes. This is a pure function of (cap table, exit value,
//! conversion set); the conversion evaluator calls it once per what-if.
//!
//! Treatment per class under a scenario:
//!
//! | Class                         | Preference claim | Residual pool participant |
//! |-------------------------------|------------------|---------------------------|
//! | Common                        | none             | yes, uncapped             |
//! | Participating                 | yes              | yes, room = cap − pref    |
//! | Non-participating, converted  | none             | yes, uncapped             |
//! | Non-participating, kept       | yes              | no                        |

use std::collections::BTreeSet;

use super::caps::{enforce_caps, Participant};
use super::grouping::group_by_priority;
use super::preference::pay_preferences;
use super::InvariantViolation;
use crate::models::{CapTable, PreferenceType};

/// Set of cap-table indices treated as converted to common
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConversionSet {
    converted: BTreeSet<usize>,
}

impl ConversionSet {
    /// Nobody converts (the baseline scenario)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.converted.contains(&index)
    }

    /// Copy of this set with `index` added
    pub fn with(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.converted.insert(index);
        next
    }

    /// Copy of this set with `index` removed
    pub fn without(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.converted.remove(&index);
        next
    }

    pub fn len(&self) -> usize {
        self.converted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converted.is_empty()
    }

    /// Indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.converted.iter().copied()
    }
}

impl FromIterator<usize> for ConversionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            converted: iter.into_iter().collect(),
        }
    }
}

/// Payouts of one scenario, indexed like the cap table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Preference phase payout per class
    pub preference: Vec<i64>,

    /// Participation phase payout per class
    pub participation: Vec<i64>,

    /// Class hit its participation cap
    pub capped: Vec<bool>,

    /// Residual nobody could absorb
    pub unallocated: i64,
}

impl ScenarioOutcome {
    /// Total payout for one class
    pub fn total(&self, index: usize) -> i64 {
        self.preference[index] + self.participation[index]
    }

    /// Sum over all classes plus the unallocated residual
    pub fn accounted(&self) -> i64 {
        self.preference.iter().sum::<i64>() + self.participation.iter().sum::<i64>() + self.unallocated
    }
}

/// Run the waterfall for one conversion scenario
///
/// # Arguments
///
/// * `cap_table` - Validated cap table
/// * `exit_value` - Proceeds in cents (non-negative; checked by the caller)
/// * `conversions` - Classes treated as common in this scenario
///
/// # Errors
///
/// Only `InvariantViolation` from the cap loop; valid input cannot fail here.
pub fn simulate(
    cap_table: &CapTable,
    exit_value: i64,
    conversions: &ConversionSet,
) -> Result<ScenarioOutcome, InvariantViolation> {
    let classes = cap_table.classes();
    let n = classes.len();

    // 1. Preference phase
    let claims: Vec<i64> = classes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if conversions.contains(i) {
                0
            } else {
                c.liquidation_preference()
            }
        })
        .collect();

    let groups = group_by_priority(classes);
    let preference = pay_preferences(&groups, &claims, exit_value);

    // 2. Participation phase
    let mut members: Vec<usize> = Vec::with_capacity(n);
    let mut participants: Vec<Participant> = Vec::with_capacity(n);
    for (i, class) in classes.iter().enumerate() {
        let participant = match class.preference_type() {
            PreferenceType::Common => Participant::unbounded(class.shares()),
            _ if conversions.contains(i) => Participant::unbounded(class.shares()),
            PreferenceType::Participating => match class.cap_amount() {
                Some(cap) => Participant::capped(class.shares(), cap - preference.paid[i]),
                None => Participant::unbounded(class.shares()),
            },
            PreferenceType::NonParticipating => continue,
        };
        members.push(i);
        participants.push(participant);
    }

    let caps = enforce_caps(preference.remaining, &participants)?;

    let mut participation = vec![0i64; n];
    let mut capped = vec![false; n];
    for (slot, &i) in members.iter().enumerate() {
        participation[i] = caps.allocations[slot];
        capped[i] = caps.capped[slot];
    }

    Ok(ScenarioOutcome {
        preference: preference.paid,
        participation,
        capped,
        unallocated: caps.unallocated,
    })
}
