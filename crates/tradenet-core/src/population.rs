//! Starting population.
//!
//! Transport-graph nodes are visited in ascending order. Each node gets the
//! number of regional agents `agents_per_node` asks for, all of the node's
//! home region, each holding `goods_per_agent` separate single-unit
//! entries of that region's good. If enabled, every node then gets one
//! Private agent holding one unit of every region's good. Ids therefore
//! run node by node, regional agents first.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;
use tradenet_agents::{BehaviorMap, GoodsLedger, LedgerError};
use tradenet_types::NodeId;
use tradenet_world::{RegionCatalog, WorldError};

use crate::config::PopulationConfig;
use crate::simulation::{AgentSpawn, Simulation};

/// Errors that can occur while populating a simulation.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// A node or region lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A starting ledger was malformed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A node with agents has no home region.
    #[error("node {0} has agents but no home region")]
    MissingRegion(NodeId),
}

/// Validated inputs for [`populate`].
#[derive(Debug, Clone)]
pub struct PopulationPlan {
    /// Region catalog.
    pub catalog: RegionCatalog,
    /// Regional agents per node.
    pub agents_per_node: BTreeMap<NodeId, u32>,
    /// Home region type id per node.
    pub node_regions: BTreeMap<NodeId, u32>,
    /// Starting wealth.
    pub initial_wealth: Decimal,
    /// Entries per regional agent.
    pub goods_per_agent: u32,
    /// One Private agent per node.
    pub private_agent_per_node: bool,
}

impl PopulationPlan {
    /// Build a plan from the population config.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::World`] if the region list is unusable.
    pub fn from_config(config: &PopulationConfig) -> Result<Self, PopulationError> {
        Ok(Self {
            catalog: RegionCatalog::new(config.regions.clone())?,
            agents_per_node: config.agents_per_node.clone(),
            node_regions: config.node_regions.clone(),
            initial_wealth: config.initial_wealth,
            goods_per_agent: config.goods_per_agent,
            private_agent_per_node: config.private_agent_per_node,
        })
    }
}

/// Counts of what [`populate`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationSummary {
    /// Regional agents created.
    pub regional: usize,
    /// Private agents created.
    pub private: usize,
}

/// Fill `sim` with the planned population.
///
/// # Errors
///
/// Returns [`PopulationError::World`] if `agents_per_node` names a node the
/// transport graph lacks or a node's region is not in the catalog, and
/// [`PopulationError::MissingRegion`] if a populated node has no region.
pub fn populate<R: Rng>(
    sim: &mut Simulation<R>,
    plan: &PopulationPlan,
    reuse: Option<&BehaviorMap>,
) -> Result<PopulationSummary, PopulationError> {
    for node in plan.agents_per_node.keys() {
        if !sim.transport().contains_node(*node) {
            return Err(WorldError::NodeNotFound(*node).into());
        }
    }

    let mut summary = PopulationSummary::default();
    for node in sim.transport().node_ids() {
        let count = plan.agents_per_node.get(&node).copied().unwrap_or(0);
        if count > 0 {
            let type_id = *plan
                .node_regions
                .get(&node)
                .ok_or(PopulationError::MissingRegion(node))?;
            let region = plan.catalog.region_type(type_id)?;
            for _ in 0..count {
                let goods = plan.catalog.starting_goods(type_id, plan.goods_per_agent)?;
                sim.spawn_agent(
                    AgentSpawn {
                        region: region.clone(),
                        wealth: plan.initial_wealth,
                        goods: GoodsLedger::from_goods(goods)?,
                        position: node,
                    },
                    reuse,
                )?;
                summary.regional = summary.regional.saturating_add(1);
            }
        }

        if plan.private_agent_per_node {
            sim.spawn_agent(
                AgentSpawn {
                    region: plan.catalog.private_type(),
                    wealth: plan.initial_wealth,
                    goods: GoodsLedger::from_goods(plan.catalog.private_goods())?,
                    position: node,
                },
                reuse,
            )?;
            summary.private = summary.private.saturating_add(1);
        }
        debug!(node = %node, regional = count, "Node populated");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;
    use tradenet_types::{AgentId, TradeBehavior};
    use tradenet_world::TradeGraph;

    use super::*;
    use crate::simulation::SimulationSettings;

    fn make_sim(nodes: u64) -> Simulation<SmallRng> {
        let mut graph = TradeGraph::new();
        for id in 0..nodes {
            graph.ensure_node(NodeId(id));
        }
        Simulation::new(
            graph,
            None,
            SimulationSettings::default(),
            SmallRng::seed_from_u64(42),
        )
    }

    fn make_plan(agents: &[(u64, u32)]) -> PopulationPlan {
        PopulationPlan {
            catalog: RegionCatalog::mediterranean(),
            agents_per_node: agents.iter().map(|&(n, c)| (NodeId(n), c)).collect(),
            node_regions: tradenet_world::default_node_regions(),
            initial_wealth: dec!(500),
            goods_per_agent: 10,
            private_agent_per_node: true,
        }
    }

    #[test]
    fn regional_then_private_per_node() {
        let mut sim = make_sim(2);
        let summary = populate(&mut sim, &make_plan(&[(0, 2), (1, 1)]), None);
        assert_eq!(
            summary.ok(),
            Some(PopulationSummary {
                regional: 3,
                private: 2
            })
        );

        let regions: Vec<(u64, &str, u64)> = sim
            .agents()
            .iter()
            .map(|a| (a.id.into_inner(), a.region.name.as_str(), a.position.into_inner()))
            .collect();
        assert_eq!(
            regions,
            vec![
                (1, "Adria", 0),
                (2, "Adria", 0),
                (3, "Private", 0),
                (4, "Aegean", 1),
                (5, "Private", 1),
            ]
        );
    }

    #[test]
    fn starting_ledgers() {
        let mut sim = make_sim(1);
        assert!(populate(&mut sim, &make_plan(&[(0, 1)]), None).is_ok());
        let regional = sim.agent(AgentId(1));
        assert_eq!(regional.map(|a| a.goods.len()), Some(10));
        assert_eq!(regional.map(|a| a.wealth), Some(dec!(500)));
        let private = sim.agent(AgentId(2));
        assert_eq!(private.map(|a| a.goods.len()), Some(11));
        assert_eq!(private.map(|a| a.region.type_id), Some(11));
    }

    #[test]
    fn unpopulated_nodes_still_get_a_private_agent() {
        let mut sim = make_sim(3);
        let summary = populate(&mut sim, &make_plan(&[(1, 1)]), None);
        assert_eq!(summary.map(|s| s.private).ok(), Some(3));
        assert_eq!(sim.agents().len(), 4);
    }

    #[test]
    fn private_agents_can_be_disabled() {
        let mut sim = make_sim(2);
        let mut plan = make_plan(&[(0, 2)]);
        plan.private_agent_per_node = false;
        assert!(populate(&mut sim, &plan, None).is_ok());
        assert!(sim.agents().iter().all(|a| !a.region.private));
    }

    #[test]
    fn node_outside_graph_rejected() {
        let mut sim = make_sim(2);
        let result = populate(&mut sim, &make_plan(&[(5, 1)]), None);
        assert!(matches!(
            result,
            Err(PopulationError::World {
                source: WorldError::NodeNotFound(NodeId(5))
            })
        ));
    }

    #[test]
    fn populated_node_without_region_rejected() {
        let mut sim = make_sim(12);
        let result = populate(&mut sim, &make_plan(&[(11, 1)]), None);
        assert!(matches!(
            result,
            Err(PopulationError::MissingRegion(NodeId(11)))
        ));
    }

    #[test]
    fn reuse_map_carries_over() {
        let mut first = make_sim(2);
        let plan = make_plan(&[(0, 3), (1, 3)]);
        assert!(populate(&mut first, &plan, None).is_ok());
        let behaviors = first.into_behaviors();

        let mut second = Simulation::new(
            make_sim(2).transport().clone(),
            None,
            SimulationSettings::default(),
            SmallRng::seed_from_u64(999),
        );
        assert!(populate(&mut second, &plan, Some(&behaviors)).is_ok());
        assert_eq!(second.behaviors(), &behaviors);
        let aggressive = second
            .agents()
            .iter()
            .filter(|a| a.behavior == TradeBehavior::Aggressive)
            .count();
        assert_eq!(
            aggressive,
            behaviors
                .values()
                .filter(|&&b| b == TradeBehavior::Aggressive)
                .count()
        );
    }
}
