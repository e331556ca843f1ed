//! The trading agent.
//!
//! One [`Agent`] type covers every region: the region is data
//! ([`RegionType`]), not a subtype. An agent's activity is a one-way
//! switch. Once [`Agent::deactivate`] has run, movement and trade leave the
//! agent untouched for the rest of the simulation.

use rust_decimal::Decimal;
use tradenet_types::{AgentId, AgentReport, NodeId, RegionType, TradeBehavior};

use crate::ledger::GoodsLedger;

/// A stateful trader standing on a graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Unique identifier, assigned by the owning simulation.
    pub id: AgentId,
    /// Immutable region classification.
    pub region: RegionType,
    /// Current wealth. Movement costs drain it; trades move it between
    /// the two parties.
    pub wealth: Decimal,
    /// Owned goods.
    pub goods: GoodsLedger,
    /// Node the agent currently stands on.
    pub position: NodeId,
    /// Whether the agent has completed a trade this step.
    pub has_traded: bool,
    /// Trade-amount strategy, fixed for the agent's lifetime.
    pub behavior: TradeBehavior,
    /// Customs weight of the edge traversed by the previous move. Used by
    /// the next movement decision, which gives customs a one-step lag.
    pub last_customs_weight: Decimal,
    /// Transport weight of the edge traversed by the previous move.
    pub last_transport_weight: Decimal,
    /// Every node moved to, in order. The starting node is not included.
    pub movement_history: Vec<NodeId>,
    active: bool,
}

impl Agent {
    /// Create an active agent at `position`.
    pub const fn new(
        id: AgentId,
        region: RegionType,
        wealth: Decimal,
        goods: GoodsLedger,
        position: NodeId,
        behavior: TradeBehavior,
    ) -> Self {
        Self {
            id,
            region,
            wealth,
            goods,
            position,
            has_traded: false,
            behavior,
            last_customs_weight: Decimal::ZERO,
            last_transport_weight: Decimal::ZERO,
            movement_history: Vec::new(),
            active: true,
        }
    }

    /// Whether the agent still takes part in the simulation.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Permanently retire the agent. Returns `true` if this call changed
    /// its state.
    pub const fn deactivate(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Whether the agent may enter a trade right now.
    pub const fn can_trade(&self) -> bool {
        self.active && !self.has_traded
    }

    /// Read-only snapshot for output.
    pub fn report(&self) -> AgentReport {
        AgentReport {
            agent_id: self.id,
            region: self.region.name.clone(),
            wealth: self.wealth,
            behavior: self.behavior,
            active: self.active,
            goods: self.goods.summary(),
        }
    }
}
