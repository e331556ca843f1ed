//! Agent state, goods ledgers, movement, and barter trade for Tradenet.
//!
//! This crate contains the per-agent logic layer -- everything that
//! operates on one or two agents without knowing about the whole
//! population. It sits between `tradenet-types`/`tradenet-world` (data and
//! graphs) and `tradenet-core` (pairing, stepping, and runs).
//!
//! Every stochastic operation takes the caller's random source as an
//! explicit `&mut impl Rng`; nothing in this crate reaches for a global
//! generator.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] entity and its read-only report.
//! - [`behavior`] -- Trade-amount strategies and behavior assignment.
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`ledger`] -- The ordered, non-coalescing [`GoodsLedger`].
//! - [`movement`] -- Movement policies: destination choice and cost payment.
//! - [`sampling`] -- Uniform sampling without replacement.
//! - [`trade`] -- The bidirectional barter [`execute_trade`].

pub mod agent;
pub mod behavior;
pub mod error;
pub mod ledger;
pub mod movement;
pub mod sampling;
pub mod trade;

// Re-export primary types at crate root for convenience.
pub use agent::Agent;
pub use behavior::{BehaviorMap, assign_behavior, trade_amount};
pub use error::AgentError;
pub use ledger::{GoodsLedger, LedgerError};
pub use movement::{
    DEFAULT_NEIGHBOR_SAMPLE, DeactivationReason, MovementContext, MovementOutcome, MovementPolicy,
    move_agent,
};
pub use trade::{
    DEFAULT_COUNTER_OFFER_SAMPLE, Exchange, TradeError, TradeOutcome, TradeSkipReason,
    TradeSummary, execute_trade, pair_wealth,
};
