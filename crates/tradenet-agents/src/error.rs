//! Error types for the tradenet-agents crate.
//!
//! Only structural invariant violations surface here. Running out of
//! money, having nowhere to go, or holding nothing to trade are ordinary
//! outcomes and are reported through return values instead.

use tradenet_world::WorldError;

use crate::ledger::LedgerError;

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent referenced a node or edge that the graph does not have.
    #[error("graph lookup failed: {0}")]
    World(#[from] WorldError),

    /// A ledger invariant was violated.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A decimal computation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
