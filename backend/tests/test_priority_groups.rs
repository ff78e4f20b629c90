//! Priority Group Tests
//!
//! Classes sharing a priority are one group: they are paid together, and when
//! the proceeds cannot cover the group's claims they split what is available
//! pro-rata by claim. Nothing flows to a lower priority until every higher
//! group is paid in full.

use waterfall_core_rs::waterfall::{group_by_priority, pay_preferences};
use waterfall_core_rs::{CapTable, PreferenceType, ShareClass, WaterfallEngine};

const MILLION: i64 = 100_000_000; // $1M in cents

/// Three senior classes at priority 2 (claims $20M, $7.5M, $6.25M), a $5M
/// Series A at priority 1, and common
fn stacked_cap_table() -> CapTable {
    CapTable::new(vec![
        ShareClass::preferred("Series C", 1_000_000, 20 * MILLION, PreferenceType::NonParticipating)
            .with_priority(2),
        ShareClass::preferred("Series B1", 1_000_000, 15 * MILLION / 2, PreferenceType::NonParticipating)
            .with_priority(2),
        ShareClass::preferred("Series B2", 1_000_000, 25 * MILLION / 4, PreferenceType::NonParticipating)
            .with_priority(2),
        ShareClass::preferred("Series A", 1_000_000, 5 * MILLION, PreferenceType::NonParticipating)
            .with_priority(1),
        ShareClass::common("Common", 10_000_000),
    ])
    .unwrap()
}

#[test]
fn test_shared_priority_rationed_pro_rata() {
    let engine = WaterfallEngine::new(stacked_cap_table());
    let result = engine.calculate_distribution(20 * MILLION).unwrap();

    // $20M × claim / $33.75M, the odd cent to the largest remainder (B1)
    assert_eq!(result.payout("Series C"), Some(1_185_185_185));
    assert_eq!(result.payout("Series B1"), Some(444_444_445));
    assert_eq!(result.payout("Series B2"), Some(370_370_370));

    assert_eq!(result.payout("Series A"), Some(0));
    assert_eq!(result.payout("Common"), Some(0));
    assert_eq!(result.total_allocated(), 20 * MILLION);
    assert!(result.converted_classes().is_empty());
}

#[test]
fn test_group_paid_in_full_before_next_priority() {
    let engine = WaterfallEngine::new(stacked_cap_table());

    // $35M covers the $33.75M group and leaves $1.25M for Series A
    let result = engine.calculate_distribution(35 * MILLION).unwrap();
    assert_eq!(result.payout("Series C"), Some(20 * MILLION));
    assert_eq!(result.payout("Series B1"), Some(15 * MILLION / 2));
    assert_eq!(result.payout("Series B2"), Some(25 * MILLION / 4));
    assert_eq!(result.payout("Series A"), Some(125_000_000));
    assert_eq!(result.payout("Common"), Some(0));
}

#[test]
fn test_grouping_is_independent_of_input_order() {
    let forward = stacked_cap_table();
    let mut reversed: Vec<ShareClass> = forward.classes().to_vec();
    reversed.reverse();
    let reversed = CapTable::new(reversed).unwrap();

    let a = WaterfallEngine::new(forward).calculate_distribution(20 * MILLION).unwrap();
    let b = WaterfallEngine::new(reversed).calculate_distribution(20 * MILLION).unwrap();
    assert_eq!(a.to_map(), b.to_map());
}

#[test]
fn test_rationed_priority_reported() {
    let table = stacked_cap_table();
    let groups = group_by_priority(table.classes());
    let claims: Vec<i64> = table.classes().iter().map(|c| c.liquidation_preference()).collect();

    let payout = pay_preferences(&groups, &claims, 30 * MILLION);
    assert_eq!(payout.rationed_priority, Some(2));
    assert_eq!(payout.remaining, 0);
    assert_eq!(payout.paid.iter().sum::<i64>(), 30 * MILLION);

    let payout = pay_preferences(&groups, &claims, 40 * MILLION);
    assert_eq!(payout.rationed_priority, None);
    assert_eq!(payout.remaining, 125_000_000);
}

#[test]
fn test_ratio_within_group_matches_claims() {
    let groups = group_by_priority(&[
        ShareClass::preferred("X", 1, 1, PreferenceType::NonParticipating).with_priority(1),
        ShareClass::preferred("Y", 1, 1, PreferenceType::NonParticipating).with_priority(1),
    ]);
    let payout = pay_preferences(&groups, &[3_000, 1_000], 2_000);
    assert_eq!(payout.paid, vec![1_500, 500]);
}

#[test]
fn test_zero_claim_member_gets_nothing() {
    let groups = group_by_priority(&[
        ShareClass::preferred("X", 1, 1, PreferenceType::NonParticipating).with_priority(1),
        ShareClass::preferred("Free", 1, 1, PreferenceType::NonParticipating).with_priority(1),
    ]);
    let payout = pay_preferences(&groups, &[1_000, 0], 999);
    assert_eq!(payout.paid, vec![999, 0]);
}

#[test]
fn test_common_forms_lowest_group() {
    let table = stacked_cap_table();
    let groups = group_by_priority(table.classes());
    let priorities: Vec<i32> = groups.iter().map(|g| g.priority).collect();
    assert_eq!(priorities, vec![2, 1, 0]);
    assert_eq!(groups[0].members, vec![0, 1, 2]);
    assert_eq!(groups[2].members, vec![4]);
}
