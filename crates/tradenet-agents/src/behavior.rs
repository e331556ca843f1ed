//! Trade-amount strategies.
//!
//! Each agent carries one [`TradeBehavior`] for its whole lifetime. The
//! behavior maps the agent's own ledger size (number of entries) to how
//! many entries it is willing to offer in one trade:
//!
//! - `Aggressive` -- uniform in `1..=size`.
//! - `Conservative` -- uniform in `1..=min(2, size)`.
//! - `Random` -- uniform in `1..=max(1, size / 2)`.
//!
//! An empty ledger always yields 0.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use tradenet_types::{AgentId, TradeBehavior};

/// Assigned behaviors by agent id, reusable across independent runs.
pub type BehaviorMap = BTreeMap<AgentId, TradeBehavior>;

/// How many ledger entries an agent with this behavior offers.
///
/// The result never exceeds `ledger_size`.
pub fn trade_amount(behavior: TradeBehavior, ledger_size: usize, rng: &mut impl Rng) -> usize {
    if ledger_size == 0 {
        return 0;
    }
    let upper = match behavior {
        TradeBehavior::Aggressive => ledger_size,
        TradeBehavior::Conservative => ledger_size.min(2),
        TradeBehavior::Random => (ledger_size / 2).max(1),
    };
    rng.random_range(1..=upper)
}

/// Draw a behavior uniformly from the three strategies.
pub fn assign_behavior(rng: &mut impl Rng) -> TradeBehavior {
    TradeBehavior::ALL
        .choose(rng)
        .copied()
        .unwrap_or(TradeBehavior::Random)
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    /// Random source that always produces zero bits, so every range draw
    /// lands on its lower bound.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn empty_ledger_offers_nothing() {
        let mut rng = SmallRng::seed_from_u64(42);
        for behavior in TradeBehavior::ALL {
            assert_eq!(trade_amount(behavior, 0, &mut rng), 0);
        }
    }

    #[test]
    fn amounts_stay_within_strategy_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for size in 1..=20_usize {
            for _ in 0..50 {
                let aggressive = trade_amount(TradeBehavior::Aggressive, size, &mut rng);
                assert!((1..=size).contains(&aggressive));

                let conservative = trade_amount(TradeBehavior::Conservative, size, &mut rng);
                assert!((1..=size.min(2)).contains(&conservative));

                let random = trade_amount(TradeBehavior::Random, size, &mut rng);
                assert!((1..=(size / 2).max(1)).contains(&random));
            }
        }
    }

    #[test]
    fn single_entry_ledger_always_offers_one() {
        let mut rng = SmallRng::seed_from_u64(3);
        for behavior in TradeBehavior::ALL {
            assert_eq!(trade_amount(behavior, 1, &mut rng), 1);
        }
    }

    #[test]
    fn zero_rng_forces_lower_bound() {
        let mut rng = ZeroRng;
        assert_eq!(trade_amount(TradeBehavior::Aggressive, 10, &mut rng), 1);
        assert_eq!(trade_amount(TradeBehavior::Conservative, 10, &mut rng), 1);
        assert_eq!(trade_amount(TradeBehavior::Random, 10, &mut rng), 1);
    }

    #[test]
    fn aggressive_reaches_full_ledger() {
        let mut rng = SmallRng::seed_from_u64(42);
        let saw_max = (0..500).any(|_| trade_amount(TradeBehavior::Aggressive, 4, &mut rng) == 4);
        assert!(saw_max);
    }

    #[test]
    fn assignment_covers_all_behaviors() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen = BTreeMap::new();
        for _ in 0..300 {
            *seen.entry(assign_behavior(&mut rng).name()).or_insert(0_u32) += 1;
        }
        assert_eq!(seen.len(), 3);
    }
}
