//! Shared type definitions for the Tradenet simulation.
//!
//! This crate is the single source of truth for the plain data types used
//! across the Tradenet workspace. It carries no behavior beyond
//! construction helpers and display formatting.
//!
//! # Modules
//!
//! - [`ids`] -- Integer identifier wrappers for agents and graph nodes
//! - [`enums`] -- Enumeration types (trade behaviors)
//! - [`structs`] -- Goods, region types, and per-agent reports

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::TradeBehavior;
pub use ids::{AgentId, NodeId};
pub use structs::{AgentReport, Good, PRIVATE_REGION_NAME, RegionType};
