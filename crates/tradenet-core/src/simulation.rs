//! Simulation state and the step cycle.
//!
//! A [`Simulation`] owns both graphs, every agent, the behavior assignment,
//! the id counter, and its own random source. Nothing is global, so
//! independent simulations can run side by side.
//!
//! One call to [`Simulation::step`] runs two phases:
//!
//! 1. **Movement** -- every agent, in ascending id order, makes one
//!    movement decision (resetting its trade flag if still active).
//! 2. **Pairing** -- the pairing engine runs once over the post-movement
//!    positions.
//!
//! If ledger coalescing is enabled it runs last, after pairing.
//!
//! The simulation has no step cap of its own; see [`crate::runner`].

use std::collections::BTreeSet;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};
use tradenet_agents::{
    Agent, AgentError, BehaviorMap, GoodsLedger, LedgerError, MovementContext, MovementOutcome,
    MovementPolicy, assign_behavior, move_agent,
};
use tradenet_types::{AgentId, AgentReport, NodeId, RegionType, TradeBehavior};
use tradenet_world::{TradeGraph, WorldError};

use crate::config::SimulationConfig;
use crate::pairing::{PairCosts, PairingError, PairingParams, PairingSummary, meet_agents};

/// Errors that can occur while stepping.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// An agent's movement hit a structural problem.
    #[error("movement of agent {agent_id} failed: {source}")]
    Movement {
        /// The agent being moved.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// The pairing pass failed.
    #[error("pairing failed: {source}")]
    Pairing {
        /// The underlying pairing error.
        #[from]
        source: PairingError,
    },

    /// Ledger coalescing failed.
    #[error("ledger coalescing failed: {source}")]
    Coalesce {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// Rules a simulation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Movement rule.
    pub movement: MovementPolicy,
    /// Neighbors sampled per movement decision.
    pub neighbor_sample: usize,
    /// Pairing parameters, with the rule already resolved.
    pub pairing: PairingParams,
    /// Merge same-kind ledger entries after every step.
    pub coalesce_ledgers: bool,
}

impl SimulationSettings {
    /// Derive settings from the configuration.
    pub const fn from_config(config: &SimulationConfig, customs_enabled: bool) -> Self {
        Self {
            movement: config.movement.policy,
            neighbor_sample: config.movement.neighbor_sample_size,
            pairing: PairingParams {
                rule: config.pairing.rule.resolve(customs_enabled),
                costs: config.pairing.costs,
                agent_sample: config.pairing.agent_sample_size,
                counter_offer_sample: config.trade.counter_offer_sample_size,
            },
            coalesce_ledgers: config.trade.coalesce_ledgers,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default(), false)
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    /// Step number, starting at 1.
    pub step: u64,
    /// Agents that changed node.
    pub moved: usize,
    /// Agents retired during this step.
    pub deactivated: usize,
    /// Result of the pairing pass.
    pub pairing: PairingSummary,
    /// Active agents at the end of the step.
    pub active_agents: usize,
}

/// Starting state of one agent to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpawn {
    /// Region classification.
    pub region: RegionType,
    /// Starting wealth.
    pub wealth: Decimal,
    /// Starting goods.
    pub goods: GoodsLedger,
    /// Starting node.
    pub position: NodeId,
}

/// A single simulation instance.
#[derive(Debug)]
pub struct Simulation<R> {
    transport: TradeGraph,
    customs: Option<TradeGraph>,
    settings: SimulationSettings,
    /// Kept in ascending id order.
    agents: Vec<Agent>,
    behaviors: BehaviorMap,
    next_id: u64,
    steps: u64,
    rng: R,
}

impl<R: Rng> Simulation<R> {
    /// Create an empty simulation.
    pub const fn new(
        transport: TradeGraph,
        customs: Option<TradeGraph>,
        settings: SimulationSettings,
        rng: R,
    ) -> Self {
        Self {
            transport,
            customs,
            settings,
            agents: Vec::new(),
            behaviors: BehaviorMap::new(),
            next_id: 1,
            steps: 0,
            rng,
        }
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Add an agent, assigning it the next id.
    ///
    /// The behavior comes from `reuse` when it has an entry for the new
    /// id, and is otherwise drawn uniformly from the simulation's random
    /// source. Either way it is recorded in [`Self::behaviors`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `spawn.position` is not a
    /// transport-graph node.
    pub fn spawn_agent(
        &mut self,
        spawn: AgentSpawn,
        reuse: Option<&BehaviorMap>,
    ) -> Result<AgentId, WorldError> {
        if !self.transport.contains_node(spawn.position) {
            return Err(WorldError::NodeNotFound(spawn.position));
        }

        let id = AgentId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let behavior = match reuse.and_then(|map| map.get(&id)) {
            Some(&behavior) => behavior,
            None => assign_behavior(&mut self.rng),
        };
        self.behaviors.insert(id, behavior);

        self.agents.push(Agent::new(
            id,
            spawn.region,
            spawn.wealth,
            spawn.goods,
            spawn.position,
            behavior,
        ));
        Ok(id)
    }

    // -------------------------------------------------------------------
    // Step cycle
    // -------------------------------------------------------------------

    /// Advance the simulation by one step.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] if an agent stands on an unknown node, or if
    /// a trade or coalescing pass breaks a ledger invariant.
    pub fn step(&mut self) -> Result<StepSummary, StepError> {
        let step = self.steps.saturating_add(1);
        let ctx = MovementContext {
            transport: &self.transport,
            customs: self.customs.as_ref(),
            policy: self.settings.movement,
            neighbor_sample: self.settings.neighbor_sample,
        };

        let mut moved: usize = 0;
        let mut deactivated: usize = 0;
        for agent in &mut self.agents {
            let was_active = agent.is_active();
            let outcome =
                move_agent(agent, &ctx, &mut self.rng).map_err(|source| StepError::Movement {
                    agent_id: agent.id,
                    source,
                })?;
            if matches!(outcome, MovementOutcome::Moved { .. }) {
                moved = moved.saturating_add(1);
            }
            if was_active && !agent.is_active() {
                deactivated = deactivated.saturating_add(1);
            }
        }

        let pairing = meet_agents(&mut self.agents, &self.settings.pairing, &mut self.rng)?;

        if self.settings.coalesce_ledgers {
            for agent in &mut self.agents {
                agent.goods.coalesce()?;
            }
        }

        self.steps = step;
        let summary = StepSummary {
            step,
            moved,
            deactivated,
            active_agents: self.active_count(),
            pairing,
        };
        debug!(
            step,
            moved,
            deactivated,
            trades = summary.pairing.trades_completed(),
            exchanges = summary.pairing.exchanges(),
            active_agents = summary.active_agents,
            "Step complete"
        );
        Ok(summary)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Every agent, in ascending id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up one agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .and_then(|index| self.agents.get(index))
    }

    /// Number of agents still active.
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    /// Behavior assigned to every agent so far.
    pub const fn behaviors(&self) -> &BehaviorMap {
        &self.behaviors
    }

    /// Take the behavior map, consuming the simulation.
    pub fn into_behaviors(self) -> BehaviorMap {
        self.behaviors
    }

    /// Steps completed so far.
    pub const fn step_count(&self) -> u64 {
        self.steps
    }

    /// The transport graph.
    pub const fn transport(&self) -> &TradeGraph {
        &self.transport
    }

    /// The customs graph, if one is loaded.
    pub const fn customs(&self) -> Option<&TradeGraph> {
        self.customs.as_ref()
    }

    /// Rules in force.
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Read-only snapshot of every agent.
    pub fn reports(&self) -> Vec<AgentReport> {
        self.agents.iter().map(Agent::report).collect()
    }

    /// Names of every good held by any agent.
    pub fn good_names(&self) -> BTreeSet<String> {
        self.agents
            .iter()
            .flat_map(|a| a.goods.entries().iter().map(|g| g.name.clone()))
            .collect()
    }

    /// Count agents per behavior.
    pub fn behavior_counts(&self) -> Vec<(TradeBehavior, usize)> {
        TradeBehavior::ALL
            .iter()
            .map(|&b| (b, self.agents.iter().filter(|a| a.behavior == b).count()))
            .collect()
    }

    /// Log a one-line description of the population.
    pub fn log_population(&self) {
        info!(
            agents = self.agents.len(),
            nodes = self.transport.node_count(),
            edges = self.transport.edge_count(),
            customs = self.customs.is_some(),
            rule = ?self.settings.pairing.rule,
            "Simulation populated"
        );
    }
}
