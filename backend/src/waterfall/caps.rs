//! Participation cap enforcement
//!
//! Splits the residual pool (proceeds left after preferences) among the
//! participants pro-rata by as-converted shares, while no capped participant
//! may be pushed past its cap.
//!
//! # Algorithm
//!
//! Fixed point over a shrinking set of uncapped participants:
//!
//! 1. Split the pool pro-rata across the uncapped participants.
//! 2. Anyone whose share exceeds its remaining room is clamped to exactly that
//!    room and leaves the uncapped set.
//! 3. Clamped amounts come out of the pool; repeat with the rest.
//! 4. Stop when a pass clamps nobody (commit that pass's split), the pool is
//!    empty, or no uncapped participant is left.
//!
//! Every pass that does not finish removes at least one participant, so the
//! loop runs at most `participants + 1` times. Exceeding that bound is an
//! engine defect and is reported as `InvariantViolation::CapLoopDidNotConverge`.

use tracing::trace;

use super::InvariantViolation;
use crate::core::money::allocate_pro_rata;

/// A claimant on the residual pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    /// Pro-rata weight (as-converted shares)
    pub weight: u64,

    /// How much more this participant may receive (cents); `None` = unbounded
    pub room: Option<i64>,
}

impl Participant {
    /// Participant with no cap (common, converted preferred, uncapped participating)
    pub fn unbounded(weight: u64) -> Self {
        Self { weight, room: None }
    }

    /// Participant that may receive at most `room` more cents
    pub fn capped(weight: u64, room: i64) -> Self {
        Self {
            weight,
            room: Some(room.max(0)),
        }
    }
}

/// Result of distributing the residual pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapOutcome {
    /// Amount allocated per participant (same order as the input)
    pub allocations: Vec<i64>,

    /// Participant reached its cap
    pub capped: Vec<bool>,

    /// Pool left with nobody able to absorb it (cents)
    pub unallocated: i64,

    /// Pro-rata passes run
    pub passes: usize,
}

/// Distribute `pool` across `participants`, honoring each one's room
///
/// # Example
///
/// ```
/// use waterfall_core_rs::waterfall::{enforce_caps, Participant};
///
/// // 1,000 split 1:1, but the first may only take 100 more
/// let outcome = enforce_caps(1_000, &[Participant::capped(1, 100), Participant::unbounded(1)]).unwrap();
/// assert_eq!(outcome.allocations, vec![100, 900]);
/// assert_eq!(outcome.capped, vec![true, false]);
/// assert_eq!(outcome.unallocated, 0);
/// ```
pub fn enforce_caps(pool: i64, participants: &[Participant]) -> Result<CapOutcome, InvariantViolation> {
    let mut allocations = vec![0i64; participants.len()];
    let mut capped = vec![false; participants.len()];
    let mut remaining = pool.max(0);

    // Zero-weight participants can never take a pro-rata share; a participant
    // with no room left is capped before the first pass.
    let mut active: Vec<usize> = Vec::with_capacity(participants.len());
    for (i, p) in participants.iter().enumerate() {
        if p.room == Some(0) {
            capped[i] = true;
        } else if p.weight > 0 {
            active.push(i);
        }
    }

    let max_passes = participants.len() + 1;
    let mut passes = 0;

    while passes < max_passes {
        if remaining == 0 || active.is_empty() {
            return Ok(CapOutcome {
                allocations,
                capped,
                unallocated: remaining,
                passes,
            });
        }
        passes += 1;

        let weights: Vec<u128> = active.iter().map(|&i| participants[i].weight as u128).collect();
        let shares = allocate_pro_rata(remaining, &weights);

        let mut newly_capped = Vec::new();
        for (slot, &i) in active.iter().enumerate() {
            if let Some(room) = participants[i].room {
                if shares[slot] > room {
                    newly_capped.push((i, room));
                }
            }
        }

        trace!(pass = passes, pool = remaining, active = active.len(), newly_capped = newly_capped.len(), "Cap pass");

        if newly_capped.is_empty() {
            for (slot, &i) in active.iter().enumerate() {
                allocations[i] += shares[slot];
            }
            return Ok(CapOutcome {
                allocations,
                capped,
                unallocated: 0,
                passes,
            });
        }

        for (i, room) in newly_capped {
            allocations[i] += room;
            remaining -= room;
            capped[i] = true;
        }
        active.retain(|&i| !capped[i]);
    }

    Err(InvariantViolation::CapLoopDidNotConverge { passes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_caps_is_plain_pro_rata() {
        let outcome = enforce_caps(
            10_000,
            &[Participant::unbounded(1), Participant::unbounded(3)],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![2_500, 7_500]);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.unallocated, 0);
    }

    #[test]
    fn test_cap_excess_redistributed() {
        // Capped participant would get 5,000 of 10,000 but has 1,000 of room
        let outcome = enforce_caps(
            10_000,
            &[
                Participant::capped(1, 1_000),
                Participant::unbounded(1),
            ],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![1_000, 9_000]);
        assert_eq!(outcome.capped, vec![true, false]);
        assert_eq!(outcome.passes, 2);
    }

    #[test]
    fn test_cascading_caps() {
        // Pass 1: 900 / 3 = 300 each; A (room 100) capped
        // Pass 2: 800 / 2 = 400 each; B (room 350) capped
        // Pass 3: 450 to C
        let outcome = enforce_caps(
            900,
            &[
                Participant::capped(1, 100),
                Participant::capped(1, 350),
                Participant::unbounded(1),
            ],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![100, 350, 450]);
        assert_eq!(outcome.capped, vec![true, true, false]);
        assert_eq!(outcome.passes, 3);
    }

    #[test]
    fn test_everyone_capped_leaves_residual() {
        let outcome = enforce_caps(
            1_000,
            &[Participant::capped(1, 100), Participant::capped(1, 200)],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![100, 200]);
        assert_eq!(outcome.unallocated, 700);
    }

    #[test]
    fn test_exact_fill_is_not_capped() {
        let outcome = enforce_caps(
            200,
            &[Participant::capped(1, 100), Participant::unbounded(1)],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![100, 100]);
        assert_eq!(outcome.capped, vec![false, false]);
    }

    #[test]
    fn test_zero_room_capped_up_front() {
        let outcome = enforce_caps(
            100,
            &[Participant::capped(5, 0), Participant::unbounded(1)],
        )
        .unwrap();
        assert_eq!(outcome.allocations, vec![0, 100]);
        assert!(outcome.capped[0]);
    }

    #[test]
    fn test_zero_weight_participants_only() {
        let outcome = enforce_caps(100, &[Participant::unbounded(0)]).unwrap();
        assert_eq!(outcome.allocations, vec![0]);
        assert_eq!(outcome.unallocated, 100);
        assert_eq!(outcome.passes, 0);
    }

    #[test]
    fn test_empty_pool() {
        let outcome = enforce_caps(0, &[Participant::unbounded(1)]).unwrap();
        assert_eq!(outcome.allocations, vec![0]);
        assert_eq!(outcome.unallocated, 0);
    }

    #[test]
    fn test_no_participants() {
        let outcome = enforce_caps(500, &[]).unwrap();
        assert!(outcome.allocations.is_empty());
        assert_eq!(outcome.unallocated, 500);
    }
}
