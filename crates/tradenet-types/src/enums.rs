//! Enumeration types for the Tradenet simulation.

use serde::{Deserialize, Serialize};

/// How many goods an agent is willing to put on the table in one trade.
///
/// Assigned once when the agent is created and never changed. The mapping
/// from behavior to an actual quantity lives in `tradenet-agents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeBehavior {
    /// Offers anywhere between one good and the whole ledger.
    Aggressive,
    /// Offers one or two goods.
    Conservative,
    /// Offers up to half of the ledger.
    Random,
}

impl TradeBehavior {
    /// Every behavior, in the order used for uniform assignment.
    pub const ALL: [Self; 3] = [Self::Aggressive, Self::Conservative, Self::Random];

    /// Stable name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive_trade",
            Self::Conservative => "conservative_trade",
            Self::Random => "random_trade",
        }
    }
}

impl core::fmt::Display for TradeBehavior {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
