//! Participation Cap Tests
//!
//! A capped participating class stops at `invested × cap` in total
//! (preference + participation). Whatever it would have received beyond that
//! is redistributed to the remaining uncapped participants; if none remain,
//! the excess is reported as unallocated.

use waterfall_core_rs::waterfall::{enforce_caps, Participant};
use waterfall_core_rs::{CapTable, PreferenceType, ShareClass, WaterfallEngine};

const MILLION: i64 = 100_000_000;

/// Series B: $2M, 1x participating, 2x cap; 20% of shares
fn series_b_table(cap: f64) -> CapTable {
    CapTable::new(vec![
        ShareClass::preferred("Series B", 2_000_000, 2 * MILLION, PreferenceType::Participating)
            .with_cap(cap)
            .with_priority(1),
        ShareClass::common("Common", 8_000_000),
    ])
    .unwrap()
}

#[test]
fn test_cap_binds_at_exactly_cap_amount() {
    let engine = WaterfallEngine::new(series_b_table(2.0));
    let result = engine.calculate_distribution(20 * MILLION).unwrap();

    let b = result.class_payout("Series B").unwrap();
    assert_eq!(b.preference, 2 * MILLION);
    assert_eq!(b.participation, 2 * MILLION);
    assert_eq!(b.total, 4 * MILLION);
    assert!(b.capped);

    // 20% of the $18M residual would have been $3.6M; the $1.6M excess goes to common
    assert_eq!(result.payout("Common"), Some(16 * MILLION));
    assert_eq!(result.unallocated, 0);
}

#[test]
fn test_below_cap_participates_fully() {
    let engine = WaterfallEngine::new(series_b_table(2.0));
    let result = engine.calculate_distribution(5 * MILLION).unwrap();

    assert_eq!(result.payout("Series B"), Some(260_000_000));
    assert_eq!(result.payout("Common"), Some(240_000_000));
    assert!(!result.is_capped("Series B"));
}

#[test]
fn test_uncapped_participating_double_dips() {
    let engine = WaterfallEngine::new(series_b_table(0.0));
    let result = engine.calculate_distribution(20 * MILLION).unwrap();

    assert_eq!(result.payout("Series B"), Some(560_000_000));
    assert_eq!(result.payout("Common"), Some(1_440_000_000));
    assert!(!result.is_capped("Series B"));
}

#[test]
fn test_participating_never_converts() {
    let engine = WaterfallEngine::new(series_b_table(2.0));
    let result = engine.calculate_distribution(1_000 * MILLION).unwrap();

    assert!(result.conversions.is_empty());
    assert!(!result.is_converted("Series B"));
    assert_eq!(result.payout("Series B"), Some(4 * MILLION));
}

#[test]
fn test_cap_with_preference_multiple() {
    // $1M at 2x preference, 3x cap: $2M preference, at most $1M more
    let table = CapTable::new(vec![
        ShareClass::preferred("Series A", 5_000_000, MILLION, PreferenceType::Participating)
            .with_multiple(2.0)
            .with_cap(3.0)
            .with_priority(1),
        ShareClass::common("Common", 5_000_000),
    ])
    .unwrap();
    let result = WaterfallEngine::new(table).calculate_distribution(10 * MILLION).unwrap();

    let a = result.class_payout("Series A").unwrap();
    assert_eq!(a.preference, 2 * MILLION);
    assert_eq!(a.participation, MILLION);
    assert!(a.capped);
    assert_eq!(result.payout("Common"), Some(7 * MILLION));
}

#[test]
fn test_redistribution_feeds_converted_class() {
    // Series A converts and shares the excess that Series B's cap frees up
    let table = CapTable::new(vec![
        ShareClass::preferred("Series A", 1_000_000, 3 * MILLION, PreferenceType::NonParticipating)
            .with_priority(2),
        ShareClass::preferred("Series B", 2_000_000, 2 * MILLION, PreferenceType::Participating)
            .with_cap(2.0)
            .with_priority(1),
        ShareClass::common("Common", 7_000_000),
    ])
    .unwrap();
    let result = WaterfallEngine::new(table).calculate_distribution(30 * MILLION).unwrap();

    assert!(result.is_converted("Series A"));
    assert_eq!(result.payout("Series A"), Some(325_000_000));
    assert_eq!(result.payout("Series B"), Some(4 * MILLION));
    assert!(result.is_capped("Series B"));
    assert_eq!(result.payout("Common"), Some(2_275_000_000));
}

#[test]
fn test_everyone_capped_leaves_unallocated() {
    let table = CapTable::new(vec![ShareClass::preferred(
        "Series A",
        100,
        MILLION,
        PreferenceType::Participating,
    )
    .with_cap(2.0)])
    .unwrap();
    let result = WaterfallEngine::new(table).calculate_distribution(5 * MILLION).unwrap();

    assert_eq!(result.payout("Series A"), Some(2 * MILLION));
    assert_eq!(result.unallocated, 3 * MILLION);
    assert_eq!(result.total_allocated() + result.unallocated, 5 * MILLION);
}

#[test]
fn test_cap_loop_bounded_by_participants() {
    let participants: Vec<Participant> = (1..=5).map(|i| Participant::capped(1, i * 10)).collect();
    let outcome = enforce_caps(1_000, &participants).unwrap();

    assert_eq!(outcome.allocations, vec![10, 20, 30, 40, 50]);
    assert!(outcome.capped.iter().all(|&c| c));
    assert_eq!(outcome.unallocated, 850);
    assert!(outcome.passes <= participants.len() + 1);
}

#[test]
fn test_zero_weight_participant_gets_nothing() {
    let outcome = enforce_caps(
        1_000,
        &[Participant::unbounded(0), Participant::unbounded(4)],
    )
    .unwrap();
    assert_eq!(outcome.allocations, vec![0, 1_000]);
    assert_eq!(outcome.unallocated, 0);
}
