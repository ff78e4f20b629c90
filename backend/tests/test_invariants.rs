//! Distribution Invariant Tests
//!
//! Property tests over randomly generated cap tables and exit values:
//!
//! - **Conservation**: payouts + unallocated == exit value, to the cent
//! - **Non-negativity**: no class is ever paid a negative amount
//! - **Caps**: no capped participating class exceeds invested × cap
//! - **Dominance**: once every preference can be covered, no non-participating
//!   class ends up with less than its preference
//! - **Tie law**: inside a rationed priority group, payouts follow claims
//! - **Determinism**: the same call twice gives the same result

use proptest::prelude::*;
use waterfall_core_rs::waterfall::{group_by_priority, pay_preferences};
use waterfall_core_rs::{
    calculate_distribution, CapTable, PreferenceType, ShareClass, WaterfallEngine,
};

const MULTIPLES: [f64; 5] = [0.5, 1.0, 1.5, 2.0, 3.0];

/// (kind, shares, invested cents, multiple index, cap headroom, priority, convertible)
type ClassSpec = (u8, u64, i64, usize, Option<u8>, i32, bool);

fn class_spec() -> impl Strategy<Value = ClassSpec> {
    (
        0u8..3,
        0u64..10_000_000,
        0i64..10_000_000_000,
        0usize..MULTIPLES.len(),
        prop::option::of(0u8..3),
        0i32..4,
        any::<bool>(),
    )
}

fn build_cap_table(specs: Vec<ClassSpec>) -> CapTable {
    let classes = specs
        .into_iter()
        .enumerate()
        .map(|(i, (kind, shares, invested, multiple, headroom, priority, convertible))| {
            let name = format!("Class {}", i);
            let multiple = MULTIPLES[multiple];
            match kind {
                0 => ShareClass::common(name, shares),
                1 => ShareClass::preferred(name, shares, invested, PreferenceType::NonParticipating)
                    .with_multiple(multiple)
                    .with_priority(priority)
                    .with_convertible(convertible),
                _ => {
                    // Caps always cover the preference, as validation requires
                    let cap = headroom.map(|h| multiple.max(1.0) + h as f64).unwrap_or(0.0);
                    ShareClass::preferred(name, shares, invested, PreferenceType::Participating)
                        .with_multiple(multiple)
                        .with_cap(cap)
                        .with_priority(priority)
                }
            }
        })
        .collect();

    CapTable::new(classes).unwrap()
}

fn cap_table() -> impl Strategy<Value = CapTable> {
    prop::collection::vec(class_spec(), 1..7).prop_map(build_cap_table)
}

proptest! {
    #[test]
    fn prop_conservation_and_non_negativity(
        table in cap_table(),
        exit_value in 0i64..50_000_000_000,
    ) {
        let result = calculate_distribution(&table, exit_value).unwrap();

        prop_assert!(result.unallocated >= 0);
        prop_assert_eq!(result.total_allocated() + result.unallocated, exit_value);

        for payout in &result.payouts {
            prop_assert!(payout.preference >= 0);
            prop_assert!(payout.participation >= 0);
            prop_assert_eq!(payout.total, payout.preference + payout.participation);
        }
    }
}

proptest! {
    #[test]
    fn prop_caps_respected(
        table in cap_table(),
        exit_value in 0i64..50_000_000_000,
    ) {
        let result = calculate_distribution(&table, exit_value).unwrap();

        for (class, payout) in table.classes().iter().zip(&result.payouts) {
            if let Some(cap) = class.cap_amount() {
                prop_assert!(
                    payout.total <= cap,
                    "{} paid {} above cap {}", class.name(), payout.total, cap
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_conversion_never_worse_than_preference(
        table in cap_table(),
        surplus in 0i64..20_000_000_000,
    ) {
        let exit_value = table.total_preference() + surplus;
        let result = calculate_distribution(&table, exit_value).unwrap();

        for (class, payout) in table.classes().iter().zip(&result.payouts) {
            if class.preference_type() == PreferenceType::NonParticipating {
                prop_assert!(
                    payout.total >= class.liquidation_preference(),
                    "{} paid {} below preference {}",
                    class.name(), payout.total, class.liquidation_preference()
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_common_absorbs_everything(
        table in cap_table(),
        common_shares in 1u64..10_000_000,
        low in 0i64..25_000_000_000,
        step in 0i64..25_000_000_000,
    ) {
        let mut classes = table.classes().to_vec();
        classes.push(ShareClass::common("Residual Common", common_shares));
        let table = CapTable::new(classes).unwrap();

        let lower = calculate_distribution(&table, low).unwrap();
        let upper = calculate_distribution(&table, low + step).unwrap();

        prop_assert_eq!(lower.unallocated, 0);
        prop_assert_eq!(upper.unallocated, 0);
        prop_assert!(upper.total_allocated() >= lower.total_allocated());
    }
}

proptest! {
    #[test]
    fn prop_rationed_group_follows_claims(
        claims in prop::collection::vec(0i64..10_000_000_000, 2..6),
        fraction in 0.0f64..1.0,
    ) {
        let classes: Vec<ShareClass> = (0..claims.len())
            .map(|i| ShareClass::preferred(format!("P{}", i), 1, 1, PreferenceType::NonParticipating)
                .with_priority(1))
            .collect();
        let groups = group_by_priority(&classes);
        let total: i64 = claims.iter().sum();
        let funds = (total as f64 * fraction) as i64;

        let payout = pay_preferences(&groups, &claims, funds);
        prop_assert_eq!(payout.paid.iter().sum::<i64>(), funds.min(total));

        // Each part is within one cent of its exact share, so cross products
        // differ by less than the sum of the two claims
        for i in 0..claims.len() {
            for j in 0..claims.len() {
                let lhs = payout.paid[i] as i128 * claims[j] as i128;
                let rhs = payout.paid[j] as i128 * claims[i] as i128;
                prop_assert!(
                    (lhs - rhs).abs() < (claims[i] + claims[j]) as i128 + 1,
                    "paid {:?} not proportional to claims {:?}", payout.paid, claims
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn prop_deterministic_and_order_independent_batches(
        table in cap_table(),
        exit_values in prop::collection::vec(0i64..50_000_000_000, 0..12),
    ) {
        let engine = WaterfallEngine::new(table);
        let sequential = engine.calculate_batch(&exit_values);
        let again = engine.calculate_batch(&exit_values);
        let parallel = engine.calculate_batch_parallel(&exit_values, 3);

        prop_assert_eq!(&sequential, &again);
        prop_assert_eq!(&sequential, &parallel);
    }
}
