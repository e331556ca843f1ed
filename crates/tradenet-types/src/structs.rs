//! Core data structs: goods, region types, and agent reports.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::TradeBehavior;
use crate::ids::AgentId;

/// Display name of the composite region type.
pub const PRIVATE_REGION_NAME: &str = "Private";

/// One entry in an agent's goods ledger.
///
/// Entries are never merged by name: two entries with the same name are
/// two separate lots, possibly at different prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Good {
    /// Name of the good, e.g. `"AegeanPottery"`.
    pub name: String,
    /// Units held in this entry.
    pub quantity: u32,
    /// Price of one unit.
    pub price: Decimal,
}

impl Good {
    /// Create a ledger entry.
    pub fn new(name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Create a single-unit entry, the shape every traded good takes.
    pub fn unit(name: impl Into<String>, price: Decimal) -> Self {
        Self::new(name, 1, price)
    }

    /// Whether this entry describes the same lot kind (name and price).
    pub fn same_kind(&self, name: &str, price: Decimal) -> bool {
        self.name == name && self.price == price
    }
}

/// The economic classification an agent belongs to.
///
/// Regional types hold one region's good. The composite "Private" type
/// holds one unit of every region's good and is treated specially by the
/// private-aware pairing rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionType {
    /// Numeric type id, unique per region type.
    pub type_id: u32,
    /// Human-readable name, e.g. `"Egypt"`.
    pub name: String,
    /// Whether this is the composite "Private" type.
    pub private: bool,
}

impl RegionType {
    /// A regional type.
    pub fn regional(type_id: u32, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            private: false,
        }
    }

    /// The composite "Private" type with the given type id.
    pub fn private(type_id: u32) -> Self {
        Self {
            type_id,
            name: PRIVATE_REGION_NAME.to_owned(),
            private: true,
        }
    }
}

/// Read-only end-of-run view of a single agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReport {
    /// The agent's identifier.
    pub agent_id: AgentId,
    /// Name of the agent's region type.
    pub region: String,
    /// Final wealth.
    pub wealth: Decimal,
    /// Assigned trade behavior.
    pub behavior: TradeBehavior,
    /// Whether the agent was still active.
    pub active: bool,
    /// Total quantity held per good name.
    pub goods: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn unit_good_has_quantity_one() {
        let good = Good::unit("EgyptianPottery", dec!(4));
        assert_eq!(good.quantity, 1);
        assert!(good.same_kind("EgyptianPottery", dec!(4)));
        assert!(!good.same_kind("EgyptianPottery", dec!(5)));
    }

    #[test]
    fn private_region_is_flagged() {
        let private = RegionType::private(11);
        assert!(private.private);
        assert_eq!(private.name, PRIVATE_REGION_NAME);
        assert!(!RegionType::regional(0, "Adria").private);
    }
}
