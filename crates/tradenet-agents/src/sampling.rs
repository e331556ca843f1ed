//! Uniform sampling without replacement.
//!
//! All subset draws in the simulation (neighbor candidates, offered goods,
//! counter-offer candidates, pairing pools) go through this module so that
//! they consume the random source the same way.

use rand::Rng;
use rand::seq::index;

/// Draw `amount` distinct indices from `0..len`, uniformly, in draw order.
///
/// `amount` is clamped to `len`, so asking for more than exists returns
/// every index (in random order).
pub fn sample_indices(rng: &mut impl Rng, len: usize, amount: usize) -> Vec<usize> {
    index::sample(rng, len, amount.min(len)).into_vec()
}

/// Draw up to `amount` distinct elements of `items`, cloned, in draw order.
pub fn sample_cloned<T: Clone>(rng: &mut impl Rng, items: &[T], amount: usize) -> Vec<T> {
    sample_indices(rng, items.len(), amount)
        .into_iter()
        .filter_map(|i| items.get(i).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn indices_are_distinct_and_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let picked = sample_indices(&mut rng, 10, 5);
            assert_eq!(picked.len(), 5);
            let unique: BTreeSet<usize> = picked.iter().copied().collect();
            assert_eq!(unique.len(), 5);
            assert!(picked.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn amount_is_clamped() {
        let mut rng = SmallRng::seed_from_u64(7);
        let picked = sample_indices(&mut rng, 3, 5);
        let unique: BTreeSet<usize> = picked.iter().copied().collect();
        assert_eq!(unique, BTreeSet::from([0, 1, 2]));
        assert!(sample_indices(&mut rng, 0, 3).is_empty());
    }

    #[test]
    fn cloned_sample_comes_from_slice() {
        let mut rng = SmallRng::seed_from_u64(1);
        let items = ["a", "b", "c", "d"];
        let picked = sample_cloned(&mut rng, &items, 2);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|p| items.contains(p)));
    }
}
