//! Movement policies.
//!
//! Every step, each active agent makes one movement decision against the
//! transport graph (and, when one is loaded, the customs graph). Two
//! policies exist:
//!
//! - [`MovementPolicy::CheapestAffordable`] samples up to
//!   `neighbor_sample` neighbors and moves to the one with the strictly
//!   lowest total cost the agent can afford. The first sampled neighbor
//!   wins a tie. The customs part of the cost is the agent's ledger size
//!   times the customs weight of the edge it traversed *last* move, so the
//!   customs charge lags one hop behind. An agent with no affordable
//!   candidate is deactivated.
//! - [`MovementPolicy::RandomWalk`] moves to one uniformly chosen neighbor
//!   and pays that edge's transport cost whatever the agent's wealth. An
//!   agent whose wealth reaches zero or less is deactivated on the spot.
//!
//! Under both policies an agent that starts the step with non-positive
//! wealth, or stands on a node with no neighbors, is deactivated and does
//! not move.

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradenet_types::NodeId;
use tradenet_world::TradeGraph;

use crate::agent::Agent;
use crate::error::AgentError;
use crate::sampling::sample_cloned;

/// Default number of neighbors considered per movement decision.
pub const DEFAULT_NEIGHBOR_SAMPLE: usize = 5;

/// Which destination rule agents follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Cheapest affordable of a random neighbor sample.
    #[default]
    CheapestAffordable,
    /// One uniformly random neighbor, cost paid unconditionally.
    RandomWalk,
}

/// Read-only world view handed to each movement decision.
#[derive(Debug, Clone, Copy)]
pub struct MovementContext<'a> {
    /// Graph whose edge weights are transport costs.
    pub transport: &'a TradeGraph,
    /// Optional graph whose edge weights are per-good customs rates.
    pub customs: Option<&'a TradeGraph>,
    /// Destination rule.
    pub policy: MovementPolicy,
    /// Maximum neighbors sampled by [`MovementPolicy::CheapestAffordable`].
    pub neighbor_sample: usize,
}

impl<'a> MovementContext<'a> {
    /// Context with the default policy and sample size.
    pub const fn new(transport: &'a TradeGraph, customs: Option<&'a TradeGraph>) -> Self {
        Self {
            transport,
            customs,
            policy: MovementPolicy::CheapestAffordable,
            neighbor_sample: DEFAULT_NEIGHBOR_SAMPLE,
        }
    }
}

/// Why an agent was retired during movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationReason {
    /// Wealth was zero or negative.
    Bankrupt,
    /// The agent's node has no neighbors.
    NoNeighbors,
    /// No sampled neighbor was affordable.
    NoAffordableMove,
}

/// What one movement decision did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementOutcome {
    /// The agent was already inactive; nothing changed.
    AlreadyInactive,
    /// The agent moved and paid `cost`.
    Moved {
        /// Node left.
        from: NodeId,
        /// Node reached.
        to: NodeId,
        /// Transport plus customs cost paid.
        cost: Decimal,
        /// Whether wealth is zero or less after paying. Under
        /// [`MovementPolicy::RandomWalk`] the agent has also been
        /// deactivated; otherwise it stays active until its next decision.
        exhausted: bool,
    },
    /// The agent was deactivated without moving.
    Deactivated {
        /// Why.
        reason: DeactivationReason,
    },
}

/// Run one movement decision for `agent`.
///
/// Resets the agent's per-step trade flag if it is still active.
///
/// # Errors
///
/// Returns [`AgentError::World`] if the agent stands on a node missing from
/// the transport graph, and [`AgentError::ArithmeticOverflow`] if a cost
/// computation overflows.
pub fn move_agent(
    agent: &mut Agent,
    ctx: &MovementContext<'_>,
    rng: &mut impl Rng,
) -> Result<MovementOutcome, AgentError> {
    if !agent.is_active() {
        return Ok(MovementOutcome::AlreadyInactive);
    }
    if agent.wealth <= Decimal::ZERO {
        return Ok(retire(agent, DeactivationReason::Bankrupt));
    }

    agent.has_traded = false;

    let neighbors = ctx.transport.neighbors(agent.position)?;
    if neighbors.is_empty() {
        return Ok(retire(agent, DeactivationReason::NoNeighbors));
    }

    match ctx.policy {
        MovementPolicy::CheapestAffordable => move_cheapest(agent, ctx, &neighbors, rng),
        MovementPolicy::RandomWalk => move_random(agent, ctx, &neighbors, rng),
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

fn move_cheapest(
    agent: &mut Agent,
    ctx: &MovementContext<'_>,
    neighbors: &[NodeId],
    rng: &mut impl Rng,
) -> Result<MovementOutcome, AgentError> {
    let customs_cost = match ctx.customs {
        Some(_) => Decimal::from(agent.goods.len())
            .checked_mul(agent.last_customs_weight)
            .ok_or_else(|| overflow("customs cost"))?,
        None => Decimal::ZERO,
    };

    let mut best: Option<(NodeId, Decimal)> = None;
    for candidate in sample_cloned(rng, neighbors, ctx.neighbor_sample) {
        let transport_cost = ctx.transport.weight(agent.position, candidate)?;
        let total = transport_cost
            .checked_add(customs_cost)
            .ok_or_else(|| overflow("movement cost"))?;
        if agent.wealth < total {
            continue;
        }
        if best.is_none_or(|(_, best_cost)| total < best_cost) {
            best = Some((candidate, total));
        }
    }

    let Some((destination, cost)) = best else {
        return Ok(retire(agent, DeactivationReason::NoAffordableMove));
    };

    let from = agent.position;
    relocate(agent, ctx, destination, cost)?;
    let exhausted = agent.wealth <= Decimal::ZERO;
    debug!(
        agent_id = %agent.id,
        from = %from,
        to = %destination,
        cost = %cost,
        wealth = %agent.wealth,
        "Agent moved"
    );
    Ok(MovementOutcome::Moved {
        from,
        to: destination,
        cost,
        exhausted,
    })
}

fn move_random(
    agent: &mut Agent,
    ctx: &MovementContext<'_>,
    neighbors: &[NodeId],
    rng: &mut impl Rng,
) -> Result<MovementOutcome, AgentError> {
    let Some(&destination) = neighbors.choose(rng) else {
        return Ok(retire(agent, DeactivationReason::NoNeighbors));
    };
    let cost = ctx.transport.weight(agent.position, destination)?;

    let from = agent.position;
    relocate(agent, ctx, destination, cost)?;
    let exhausted = agent.wealth <= Decimal::ZERO;
    if exhausted {
        agent.deactivate();
    }
    debug!(
        agent_id = %agent.id,
        from = %from,
        to = %destination,
        cost = %cost,
        wealth = %agent.wealth,
        exhausted,
        "Agent wandered"
    );
    Ok(MovementOutcome::Moved {
        from,
        to: destination,
        cost,
        exhausted,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pay `cost`, step onto `destination`, and record the edge weights just
/// traversed for the next decision.
fn relocate(
    agent: &mut Agent,
    ctx: &MovementContext<'_>,
    destination: NodeId,
    cost: Decimal,
) -> Result<(), AgentError> {
    let transport_weight = ctx.transport.weight(agent.position, destination)?;
    let customs_weight = ctx
        .customs
        .map_or(Decimal::ZERO, |customs| {
            customs.weight_or_zero(agent.position, destination)
        });

    agent.wealth = agent
        .wealth
        .checked_sub(cost)
        .ok_or_else(|| overflow("wealth after movement"))?;
    agent.position = destination;
    agent.last_transport_weight = transport_weight;
    agent.last_customs_weight = customs_weight;
    agent.movement_history.push(destination);
    Ok(())
}

fn retire(agent: &mut Agent, reason: DeactivationReason) -> MovementOutcome {
    agent.deactivate();
    debug!(
        agent_id = %agent.id,
        position = %agent.position,
        wealth = %agent.wealth,
        ?reason,
        "Agent deactivated"
    );
    MovementOutcome::Deactivated { reason }
}

fn overflow(context: &str) -> AgentError {
    AgentError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;
    use tradenet_types::{AgentId, Good, RegionType, TradeBehavior};

    use super::*;
    use crate::ledger::GoodsLedger;

    /// Star graph: node 0 joined to 1..=3 with weights 10, 3, 7.
    fn make_star() -> TradeGraph {
        let mut graph = TradeGraph::new();
        for id in 0..4 {
            graph.ensure_node(NodeId(id));
        }
        let _ = graph.add_edge(NodeId(0), NodeId(1), dec!(10));
        let _ = graph.add_edge(NodeId(0), NodeId(2), dec!(3));
        let _ = graph.add_edge(NodeId(0), NodeId(3), dec!(7));
        graph
    }

    fn make_agent(wealth: Decimal, goods: usize) -> Agent {
        let ledger = GoodsLedger::from_goods(
            (0..goods).map(|_| Good::unit("AdriaticPottery", dec!(4))).collect(),
        )
        .unwrap_or_default();
        Agent::new(
            AgentId(1),
            RegionType::regional(0, "Adria"),
            wealth,
            ledger,
            NodeId(0),
            TradeBehavior::Aggressive,
        )
    }

    #[test]
    fn picks_cheapest_sampled_neighbor() {
        let graph = make_star();
        let ctx = MovementContext::new(&graph, None);
        let mut agent = make_agent(dec!(500), 10);
        agent.has_traded = true;
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = move_agent(&mut agent, &ctx, &mut rng).unwrap_or(MovementOutcome::AlreadyInactive);
        assert_eq!(
            outcome,
            MovementOutcome::Moved {
                from: NodeId(0),
                to: NodeId(2),
                cost: dec!(3),
                exhausted: false,
            }
        );
        assert_eq!(agent.position, NodeId(2));
        assert_eq!(agent.wealth, dec!(497));
        assert_eq!(agent.last_transport_weight, dec!(3));
        assert_eq!(agent.movement_history, vec![NodeId(2)]);
        assert!(!agent.has_traded);
    }

    #[test]
    fn unaffordable_everywhere_deactivates_in_place() {
        let mut graph = TradeGraph::new();
        for id in 0..3 {
            graph.ensure_node(NodeId(id));
        }
        let _ = graph.add_edge(NodeId(0), NodeId(1), dec!(10));
        let _ = graph.add_edge(NodeId(0), NodeId(2), dec!(10));
        let ctx = MovementContext::new(&graph, None);
        let mut agent = make_agent(dec!(5), 10);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(
            outcome,
            Ok(MovementOutcome::Deactivated {
                reason: DeactivationReason::NoAffordableMove
            })
        ));
        assert!(!agent.is_active());
        assert_eq!(agent.position, NodeId(0));
        assert_eq!(agent.wealth, dec!(5));
    }

    #[test]
    fn exact_wealth_is_affordable() {
        let graph = make_star();
        let ctx = MovementContext::new(&graph, None);
        let mut agent = make_agent(dec!(3), 1);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(
            outcome,
            Ok(MovementOutcome::Moved {
                exhausted: true,
                ..
            })
        ));
        assert!(agent.is_active());
        assert_eq!(agent.wealth, Decimal::ZERO);

        // The next decision retires it.
        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(
            outcome,
            Ok(MovementOutcome::Deactivated {
                reason: DeactivationReason::Bankrupt
            })
        ));
        assert_eq!(agent.position, NodeId(2));
    }

    #[test]
    fn customs_uses_previous_hop_weight() {
        let transport = make_star();
        let mut customs = TradeGraph::new();
        for id in 0..4 {
            customs.ensure_node(NodeId(id));
        }
        let _ = customs.add_edge(NodeId(0), NodeId(2), dec!(2));
        let ctx = MovementContext::new(&transport, Some(&customs));
        let mut rng = SmallRng::seed_from_u64(42);

        // No previous hop: only transport is charged.
        let mut agent = make_agent(dec!(500), 10);
        let _ = move_agent(&mut agent, &ctx, &mut rng);
        assert_eq!(agent.wealth, dec!(497));
        assert_eq!(agent.last_customs_weight, dec!(2));

        // Back from 2 to 0 (its only neighbor): 3 transport + 10 goods * 2.
        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(
            outcome,
            Ok(MovementOutcome::Moved { to: NodeId(0), .. })
        ));
        assert_eq!(agent.wealth, dec!(474));
    }

    #[test]
    fn missing_customs_edge_counts_as_zero() {
        let transport = make_star();
        let customs = TradeGraph::new();
        let ctx = MovementContext::new(&transport, Some(&customs));
        let mut agent = make_agent(dec!(500), 10);
        agent.last_customs_weight = dec!(9);
        let mut rng = SmallRng::seed_from_u64(42);

        let _ = move_agent(&mut agent, &ctx, &mut rng);
        assert_eq!(agent.wealth, dec!(407));
        assert_eq!(agent.last_customs_weight, Decimal::ZERO);
    }

    #[test]
    fn isolated_node_deactivates() {
        let mut graph = TradeGraph::new();
        graph.ensure_node(NodeId(0));
        let mut rng = SmallRng::seed_from_u64(42);
        for policy in [MovementPolicy::CheapestAffordable, MovementPolicy::RandomWalk] {
            let ctx = MovementContext {
                policy,
                ..MovementContext::new(&graph, None)
            };
            let mut agent = make_agent(dec!(500), 1);
            let outcome = move_agent(&mut agent, &ctx, &mut rng);
            assert!(matches!(
                outcome,
                Ok(MovementOutcome::Deactivated {
                    reason: DeactivationReason::NoNeighbors
                })
            ));
            assert!(!agent.is_active());
        }
    }

    #[test]
    fn inactive_agent_is_untouched() {
        let graph = make_star();
        let ctx = MovementContext::new(&graph, None);
        let mut agent = make_agent(dec!(500), 3);
        agent.deactivate();
        agent.has_traded = true;
        let before = agent.clone();
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(outcome, Ok(MovementOutcome::AlreadyInactive)));
        assert_eq!(agent, before);
    }

    #[test]
    fn unknown_position_is_an_error() {
        let graph = make_star();
        let ctx = MovementContext::new(&graph, None);
        let mut agent = make_agent(dec!(500), 3);
        agent.position = NodeId(99);
        let mut rng = SmallRng::seed_from_u64(42);

        assert!(matches!(
            move_agent(&mut agent, &ctx, &mut rng),
            Err(AgentError::World(_))
        ));
    }

    #[test]
    fn random_walk_pays_and_can_go_broke() {
        let graph = make_star();
        let ctx = MovementContext {
            policy: MovementPolicy::RandomWalk,
            ..MovementContext::new(&graph, None)
        };
        let mut agent = make_agent(dec!(2), 1);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = move_agent(&mut agent, &ctx, &mut rng);
        assert!(matches!(
            outcome,
            Ok(MovementOutcome::Moved {
                exhausted: true,
                ..
            })
        ));
        assert!(!agent.is_active());
        assert!(agent.wealth < Decimal::ZERO);
        assert_ne!(agent.position, NodeId(0));
    }
}
