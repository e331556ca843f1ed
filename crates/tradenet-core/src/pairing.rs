//! The pairing engine: who trades with whom.
//!
//! After every agent has moved, each node is visited in ascending order.
//! At a node, the eligible pool is every active agent that has not traded
//! this step. While at least two remain:
//!
//! 1. Up to `agent_sample` agents are drawn from the pool.
//! 2. Every unordered pair in the draw is priced with [`pair_cost`].
//! 3. One of the cheapest pairs is picked uniformly at random.
//! 4. Both members leave the pool and trade with each other.
//!
//! This is a greedy, node-local heuristic. It does not look for a globally
//! cheapest matching.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradenet_agents::sampling::sample_indices;
use tradenet_agents::{Agent, TradeError, TradeOutcome, execute_trade};
use tradenet_types::{AgentId, NodeId, RegionType};

/// Default number of agents drawn per pairing round.
pub const DEFAULT_AGENT_SAMPLE: usize = 5;

/// Errors from a pairing pass.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    /// A trade failed structurally.
    #[error("trade failed: {source}")]
    Trade {
        /// The underlying trade error.
        #[from]
        source: TradeError,
    },

    /// A pooled index did not address two distinct agents.
    #[error("invalid agent pair: indices {first} and {second}")]
    InvalidPair {
        /// Index of the first agent.
        first: usize,
        /// Index of the second agent.
        second: usize,
    },
}

// ---------------------------------------------------------------------------
// Cost rules
// ---------------------------------------------------------------------------

/// How a pair's transaction cost is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingRule {
    /// [`Self::PrivateAware`] when a customs graph is loaded, otherwise
    /// [`Self::TypeMatch`].
    #[default]
    Auto,
    /// Private agents pair cheaply only with their own type; every pair
    /// that is not two Private agents costs the same.
    PrivateAware,
    /// Same region type is cheap, different region types are expensive.
    TypeMatch,
}

impl PairingRule {
    /// Replace [`Self::Auto`] with the concrete rule for this world.
    pub const fn resolve(self, customs_enabled: bool) -> Self {
        match self {
            Self::Auto if customs_enabled => Self::PrivateAware,
            Self::Auto => Self::TypeMatch,
            other => other,
        }
    }
}

/// Transaction-cost table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCosts {
    /// Two Private agents with the same type id.
    #[serde(default = "default_same_private")]
    pub same_private: u32,
    /// Two Private agents with different type ids.
    #[serde(default = "default_different_private")]
    pub different_private: u32,
    /// Any pair that is not two Private agents, under the private-aware rule.
    #[serde(default = "default_mixed")]
    pub mixed: u32,
    /// Same region type, under the type-match rule.
    #[serde(default = "default_same_type")]
    pub same_type: u32,
    /// Different region types, under the type-match rule.
    #[serde(default = "default_different_type")]
    pub different_type: u32,
}

impl Default for PairCosts {
    fn default() -> Self {
        Self {
            same_private: default_same_private(),
            different_private: default_different_private(),
            mixed: default_mixed(),
            same_type: default_same_type(),
            different_type: default_different_type(),
        }
    }
}

const fn default_same_private() -> u32 {
    0
}

const fn default_different_private() -> u32 {
    50
}

const fn default_mixed() -> u32 {
    1
}

const fn default_same_type() -> u32 {
    1
}

const fn default_different_type() -> u32 {
    50
}

/// Transaction cost of pairing two agents of the given region types.
///
/// [`PairingRule::Auto`] is priced like [`PairingRule::TypeMatch`]; resolve
/// it first with [`PairingRule::resolve`] when a customs graph is in play.
pub const fn pair_cost(rule: PairingRule, costs: &PairCosts, a: &RegionType, b: &RegionType) -> u32 {
    match rule {
        PairingRule::PrivateAware => {
            if a.private && b.private {
                if a.type_id == b.type_id {
                    costs.same_private
                } else {
                    costs.different_private
                }
            } else {
                costs.mixed
            }
        }
        PairingRule::TypeMatch | PairingRule::Auto => {
            if a.type_id == b.type_id {
                costs.same_type
            } else {
                costs.different_type
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pairing pass
// ---------------------------------------------------------------------------

/// Parameters of one pairing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingParams {
    /// Cost rule, already resolved.
    pub rule: PairingRule,
    /// Cost table.
    pub costs: PairCosts,
    /// Agents drawn per round.
    pub agent_sample: usize,
    /// Counter-offer candidates drawn per offered good.
    pub counter_offer_sample: usize,
}

/// One matched pair and what their trade did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMatch {
    /// Node where the pair met.
    pub node: NodeId,
    /// First party.
    pub first: AgentId,
    /// Second party.
    pub second: AgentId,
    /// Transaction cost of the pair.
    pub cost: u32,
    /// Trade result.
    pub outcome: TradeOutcome,
}

/// Everything one pairing pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingSummary {
    /// Pairs in the order they were matched.
    pub matches: Vec<PairMatch>,
}

impl PairingSummary {
    /// Number of trades that ran to completion.
    pub fn trades_completed(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| matches!(m.outcome, TradeOutcome::Completed(_)))
            .count()
    }

    /// Number of individual goods exchanges across all trades.
    pub fn exchanges(&self) -> usize {
        self.matches
            .iter()
            .map(|m| match &m.outcome {
                TradeOutcome::Completed(summary) => summary.exchanges.len(),
                TradeOutcome::Skipped(_) => 0,
            })
            .sum()
    }
}

/// Run one pairing pass over every node.
///
/// `agents` may be in any order; agents are pooled per node in slice order.
///
/// # Errors
///
/// Returns [`PairingError::Trade`] if a trade breaks a ledger or wealth
/// invariant.
pub fn meet_agents(
    agents: &mut [Agent],
    params: &PairingParams,
    rng: &mut impl Rng,
) -> Result<PairingSummary, PairingError> {
    let mut pools: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
    for (index, agent) in agents.iter().enumerate() {
        if agent.can_trade() {
            pools.entry(agent.position).or_default().push(index);
        }
    }

    let mut summary = PairingSummary::default();
    for (node, mut pool) in pools {
        debug!(node = %node, eligible = pool.len(), "Pairing agents at node");
        while pool.len() >= 2 {
            let Some((first, second, cost)) = choose_pair(agents, &pool, params, rng) else {
                break;
            };
            pool.retain(|&i| i != first && i != second);

            let [a, b] = agents
                .get_disjoint_mut([first, second])
                .ok()
                .ok_or(PairingError::InvalidPair { first, second })?;
            let outcome = execute_trade(a, b, params.counter_offer_sample, rng)?;
            debug!(
                node = %node,
                first = %a.id,
                second = %b.id,
                cost,
                "Pair matched"
            );
            summary.matches.push(PairMatch {
                node,
                first: a.id,
                second: b.id,
                cost,
                outcome,
            });
        }
    }
    Ok(summary)
}

/// Draw a sample from `pool` and pick one of its cheapest pairs.
fn choose_pair(
    agents: &[Agent],
    pool: &[usize],
    params: &PairingParams,
    rng: &mut impl Rng,
) -> Option<(usize, usize, u32)> {
    let drawn: Vec<usize> = sample_indices(rng, pool.len(), params.agent_sample)
        .into_iter()
        .filter_map(|slot| pool.get(slot).copied())
        .collect();

    let mut priced: Vec<(usize, usize, u32)> = Vec::new();
    for (offset, &first) in drawn.iter().enumerate() {
        for &second in drawn.iter().skip(offset.saturating_add(1)) {
            let (Some(a), Some(b)) = (agents.get(first), agents.get(second)) else {
                continue;
            };
            let cost = pair_cost(params.rule, &params.costs, &a.region, &b.region);
            priced.push((first, second, cost));
        }
    }

    let cheapest = priced.iter().map(|&(_, _, cost)| cost).min()?;
    let ties: Vec<(usize, usize, u32)> = priced
        .into_iter()
        .filter(|&(_, _, cost)| cost == cheapest)
        .collect();
    ties.choose(rng).copied()
}
