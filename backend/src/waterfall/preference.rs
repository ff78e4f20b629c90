//! Preference payment
//!
//! Pays liquidation preference claims group by group, highest priority first.
//!
//! # Algorithm
//!
//! ```text
//! For each priority group (descending):
//!   claim = Σ member claims
//!   claim == 0        → skip (all-common or fully converted group)
//!   funds >= claim    → pay every member in full, funds -= claim
//!   funds <  claim    → split funds pro-rata by member claim, funds = 0
//! ```
//!
//! Once a group is rationed, every lower group gets nothing from this phase.

use tracing::debug;

use super::grouping::PriorityGroup;
use crate::core::money::allocate_pro_rata;

/// Result of the preference phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencePayout {
    /// Preference paid per class (cap-table index)
    pub paid: Vec<i64>,

    /// Funds left for the participation phase (cents)
    pub remaining: i64,

    /// Priority of the group that was rationed, if any
    pub rationed_priority: Option<i32>,
}

/// Pay preference claims through the priority stack
///
/// # Arguments
///
/// * `groups` - Priority groups, highest priority first
/// * `claims` - Preference claim per class in cents (0 for classes with no claim)
/// * `funds` - Proceeds available (cents, non-negative)
///
/// # Example
///
/// ```
/// use waterfall_core_rs::waterfall::{pay_preferences, PriorityGroup};
///
/// let groups = vec![
///     PriorityGroup { priority: 2, members: vec![0] },
///     PriorityGroup { priority: 1, members: vec![1] },
/// ];
/// let payout = pay_preferences(&groups, &[2_000, 3_000], 3_000);
/// assert_eq!(payout.paid, vec![2_000, 1_000]);
/// assert_eq!(payout.remaining, 0);
/// assert_eq!(payout.rationed_priority, Some(1));
/// ```
pub fn pay_preferences(groups: &[PriorityGroup], claims: &[i64], funds: i64) -> PreferencePayout {
    let mut paid = vec![0i64; claims.len()];
    let mut remaining = funds.max(0);
    let mut rationed_priority = None;

    for group in groups {
        if remaining == 0 {
            break;
        }

        let group_claim: i64 = group.members.iter().map(|&i| claims[i]).sum();
        if group_claim == 0 {
            continue;
        }

        if remaining >= group_claim {
            for &i in &group.members {
                paid[i] = claims[i];
            }
            remaining -= group_claim;
        } else {
            let weights: Vec<u128> = group
                .members
                .iter()
                .map(|&i| claims[i].max(0) as u128)
                .collect();
            let shares = allocate_pro_rata(remaining, &weights);
            for (&i, share) in group.members.iter().zip(shares) {
                paid[i] = share;
            }

            debug!(
                priority = group.priority,
                group_claim,
                available = remaining,
                "Preference group rationed pro-rata"
            );

            rationed_priority = Some(group.priority);
            remaining = 0;
        }
    }

    PreferencePayout {
        paid,
        remaining,
        rationed_priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(priority: i32, members: &[usize]) -> PriorityGroup {
        PriorityGroup {
            priority,
            members: members.to_vec(),
        }
    }

    #[test]
    fn test_all_paid_in_full() {
        let groups = vec![group(2, &[0]), group(1, &[1]), group(0, &[2])];
        let payout = pay_preferences(&groups, &[100, 200, 0], 1_000);
        assert_eq!(payout.paid, vec![100, 200, 0]);
        assert_eq!(payout.remaining, 700);
        assert_eq!(payout.rationed_priority, None);
    }

    #[test]
    fn test_group_rationed_by_claim() {
        // $20M, $7.5M, $6.25M claims sharing $20M
        let groups = vec![group(2, &[0, 1, 2]), group(0, &[3])];
        let claims = [2_000_000_000, 750_000_000, 625_000_000, 0];
        let payout = pay_preferences(&groups, &claims, 2_000_000_000);

        assert_eq!(payout.remaining, 0);
        assert_eq!(payout.paid.iter().sum::<i64>(), 2_000_000_000);
        assert_eq!(payout.paid[3], 0);
        // 20M × 20/33.75 = 11,851,851.85...
        assert!((payout.paid[0] - 1_185_185_185).abs() <= 1);
        assert_eq!(payout.rationed_priority, Some(2));
    }

    #[test]
    fn test_lower_groups_get_nothing_after_rationing() {
        let groups = vec![group(3, &[0]), group(2, &[1]), group(1, &[2])];
        let payout = pay_preferences(&groups, &[500, 1_000, 1_000], 900);
        assert_eq!(payout.paid, vec![500, 400, 0]);
    }

    #[test]
    fn test_zero_claim_group_skipped() {
        let groups = vec![group(5, &[0]), group(1, &[1])];
        let payout = pay_preferences(&groups, &[0, 300], 200);
        assert_eq!(payout.paid, vec![0, 200]);
        assert_eq!(payout.remaining, 0);
    }

    #[test]
    fn test_zero_funds() {
        let groups = vec![group(1, &[0, 1])];
        let payout = pay_preferences(&groups, &[10, 10], 0);
        assert_eq!(payout.paid, vec![0, 0]);
        assert_eq!(payout.remaining, 0);
    }
}
