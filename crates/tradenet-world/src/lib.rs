//! Trade network graphs and regional geography for the Tradenet simulation.
//!
//! This crate models the static world: a weighted undirected transport
//! graph, an optional customs-cost graph of the same shape, and the
//! catalog of regions whose agents populate the graph's nodes.
//!
//! # Modules
//!
//! - [`edge_list`] -- Parsing of `source;target;weight` edge-list files.
//! - [`error`] -- Error types for graph and catalog operations.
//! - [`graph`] -- [`TradeGraph`], the weighted undirected graph with
//!   neighbor and symmetric weight lookup.
//! - [`regions`] -- [`RegionCatalog`] of regional goods and prices, and
//!   the default node-to-region table.

pub mod edge_list;
pub mod error;
pub mod graph;
pub mod regions;

// Re-export primary types at crate root.
pub use edge_list::{load_edge_list, parse_edge_list};
pub use error::WorldError;
pub use graph::TradeGraph;
pub use regions::{RegionCatalog, RegionSpec, default_node_regions, default_region_specs};
