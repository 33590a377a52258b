//! Property-based tests for the rotation primitive and the fairness it
//! yields when counters never cap.
//!
//! These run without a database: the walk over uncapped candidates reduces
//! to "rotate, take first", so a sequential burst can be simulated purely
//! with `rotate_after` and an in-memory pointer.

use proptest::prelude::*;
use uuid::Uuid;

use switchboard_core::{CallerId, EntityIdType};
use switchboard_engine::{rotate_after, CallerCandidate};

fn candidates(n: usize) -> Vec<CallerCandidate> {
    (1..=n as u128)
        .map(|i| CallerCandidate {
            caller_id: CallerId::new(Uuid::from_u128(i)),
            daily_limit: 0,
        })
        .collect()
}

proptest! {
    /// Rotation is a permutation: same elements, same length.
    #[test]
    fn rotation_is_a_permutation(n in 1usize..12, last_idx in proptest::option::of(0usize..12)) {
        let list = candidates(n);
        let last = last_idx.map(|i| list[i % n].caller_id);
        let rotated = rotate_after(&list, last);

        prop_assert_eq!(rotated.len(), list.len());
        let mut a: Vec<_> = rotated.iter().map(|c| c.caller_id).collect();
        let mut b: Vec<_> = list.iter().map(|c| c.caller_id).collect();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    /// The element after the pointer comes first and cyclic order is kept.
    #[test]
    fn rotation_preserves_cyclic_order(n in 1usize..12, last_idx in 0usize..12) {
        let list = candidates(n);
        let idx = last_idx % n;
        let rotated = rotate_after(&list, Some(list[idx].caller_id));

        for (offset, candidate) in rotated.iter().enumerate() {
            prop_assert_eq!(candidate.caller_id, list[(idx + 1 + offset) % n].caller_id);
        }
    }

    /// A stale pointer (not in the candidate set) degenerates to the
    /// unrotated stable order.
    #[test]
    fn stale_pointer_degenerates_to_identity(n in 1usize..12) {
        let list = candidates(n);
        let stranger = CallerId::new(Uuid::from_u128(10_000));
        let rotated = rotate_after(&list, Some(stranger));
        let same: Vec<_> = list.iter().map(|c| c.caller_id).collect();
        let got: Vec<_> = rotated.iter().map(|c| c.caller_id).collect();
        prop_assert_eq!(got, same);
    }

    /// Sequential burst fairness: with N uncapped callers and M leads,
    /// per-caller tallies differ by at most one.
    #[test]
    fn sequential_burst_is_fair(n in 1usize..8, m in 0usize..50) {
        let list = candidates(n);
        let mut pointer: Option<CallerId> = None;
        let mut tally = std::collections::HashMap::new();

        for _ in 0..m {
            let chosen = rotate_after(&list, pointer)[0].caller_id;
            *tally.entry(chosen).or_insert(0usize) += 1;
            pointer = Some(chosen);
        }

        let max = tally.values().copied().max().unwrap_or(0);
        let min = list
            .iter()
            .map(|c| tally.get(&c.caller_id).copied().unwrap_or(0))
            .min()
            .unwrap_or(0);
        prop_assert!(max - min <= 1, "unfair distribution: max {} min {}", max, min);
    }
}
