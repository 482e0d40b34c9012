//! # Index Intersection
//!
//! Sort-merge intersection of two attesting-index lists.

use shared_types::ValidatorIndex;

/// Indices present in both `a` and `b`, ascending.
///
/// Both inputs are sorted in place, then scanned with two cursors. Duplicates
/// appearing in both lists are reported once per pairing.
pub fn sorted_intersection(a: &mut [ValidatorIndex], b: &mut [ValidatorIndex]) -> Vec<ValidatorIndex> {
    a.sort_unstable();
    b.sort_unstable();

    let mut shared = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_disjoint_lists() {
        let mut a = vec![1, 3, 5];
        let mut b = vec![2, 4, 6];
        assert!(sorted_intersection(&mut a, &mut b).is_empty());
    }

    #[test]
    fn test_unsorted_input() {
        let mut a = vec![791764, 16, 9];
        let mut b = vec![32, 791764, 16];
        assert_eq!(sorted_intersection(&mut a, &mut b), vec![16, 791764]);
    }

    #[test]
    fn test_duplicates() {
        let mut a = vec![7, 7, 2];
        let mut b = vec![7, 3];
        assert_eq!(sorted_intersection(&mut a, &mut b), vec![7]);
    }

    #[test]
    fn test_empty_side() {
        let mut a = Vec::new();
        let mut b = vec![1, 2];
        assert!(sorted_intersection(&mut a, &mut b).is_empty());
    }

    proptest! {
        #[test]
        fn test_disjoint_lists_never_intersect(
            evens in prop::collection::vec(0u64..1_000_000, 0..64),
            odds in prop::collection::vec(0u64..1_000_000, 0..64),
        ) {
            let mut a: Vec<_> = evens.iter().map(|v| v * 2).collect();
            let mut b: Vec<_> = odds.iter().map(|v| v * 2 + 1).collect();
            prop_assert!(sorted_intersection(&mut a, &mut b).is_empty());
        }

        #[test]
        fn test_shared_index_found_in_any_order(
            mut a in prop::collection::vec(0u64..1_000, 0..64),
            mut b in prop::collection::vec(0u64..1_000, 0..64),
            shared in 0u64..1_000,
            copies in 1usize..4,
            positions in prop::collection::vec(any::<prop::sample::Index>(), 8),
        ) {
            for i in 0..copies {
                let at = positions[i].index(a.len() + 1);
                a.insert(at, shared);
                let at = positions[i + 4].index(b.len() + 1);
                b.insert(at, shared);
            }
            let expected: BTreeSet<_> = a.iter().filter(|v| b.contains(v)).copied().collect();

            let result = sorted_intersection(&mut a, &mut b);
            prop_assert!(result.contains(&shared));
            prop_assert!(result.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(result.into_iter().collect::<BTreeSet<_>>(), expected);
        }
    }
}
