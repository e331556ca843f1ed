//! Trade graph: nodes joined by weighted undirected edges.
//!
//! The same type backs both the transport graph (edge weight = cost of
//! travelling the edge) and the customs graph (edge weight = customs rate
//! per good carried). Weight lookup is symmetric: an edge `a-b` is stored
//! under both endpoints.
//!
//! Internally, an adjacency map indexes each node's neighbors with the
//! connecting weight: `BTreeMap<NodeId, BTreeMap<NodeId, Decimal>>`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rust_decimal::Decimal;
use tradenet_types::NodeId;

use crate::error::WorldError;

/// A weighted undirected graph of trade-network nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeGraph {
    /// Node -> (neighbor -> edge weight).
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Decimal>>,
}

impl TradeGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Add an isolated node.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateNode`] if the node already exists.
    pub fn add_node(&mut self, node: NodeId) -> Result<(), WorldError> {
        if self.adjacency.contains_key(&node) {
            return Err(WorldError::DuplicateNode(node));
        }
        self.adjacency.insert(node, BTreeMap::new());
        Ok(())
    }

    /// Add the node if it is not already present.
    pub fn ensure_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    /// Add (or re-weight) the undirected edge `a-b`.
    ///
    /// Both endpoints must already exist. Adding an edge that is already
    /// present replaces its weight and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if either endpoint is missing,
    /// or [`WorldError::NegativeWeight`] if `weight < 0`.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        weight: Decimal,
    ) -> Result<Option<Decimal>, WorldError> {
        if weight < Decimal::ZERO {
            return Err(WorldError::NegativeWeight {
                from: a,
                to: b,
                weight: weight.to_string(),
            });
        }
        if !self.adjacency.contains_key(&b) {
            return Err(WorldError::NodeNotFound(b));
        }
        let previous = self
            .adjacency
            .get_mut(&a)
            .ok_or(WorldError::NodeNotFound(a))?
            .insert(b, weight);
        if let Some(reverse) = self.adjacency.get_mut(&b) {
            reverse.insert(a, weight);
        }
        Ok(previous)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether the node exists.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Whether an edge `a-b` exists.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|neighbors| neighbors.contains_key(&b))
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Return the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let mut count: usize = 0;
        for (node, neighbors) in &self.adjacency {
            for neighbor in neighbors.keys() {
                // Count each edge once, from its lower endpoint; a
                // self-loop is stored once and counted once.
                if node <= neighbor {
                    count = count.saturating_add(1);
                }
            }
        }
        count
    }

    /// Return all node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.adjacency.keys().copied().collect()
    }

    /// Return the neighbors of `node` in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if the node is not in the
    /// graph. An agent standing on such a node is a construction bug.
    pub fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>, WorldError> {
        self.adjacency
            .get(&node)
            .map(|neighbors| neighbors.keys().copied().collect())
            .ok_or(WorldError::NodeNotFound(node))
    }

    /// Return the weight of edge `a-b`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `a` is missing, or
    /// [`WorldError::EdgeNotFound`] if the nodes are not adjacent.
    pub fn weight(&self, a: NodeId, b: NodeId) -> Result<Decimal, WorldError> {
        self.adjacency
            .get(&a)
            .ok_or(WorldError::NodeNotFound(a))?
            .get(&b)
            .copied()
            .ok_or(WorldError::EdgeNotFound { from: a, to: b })
    }

    /// Return the weight of edge `a-b`, or zero if either the nodes or the
    /// edge are absent. This is the customs-graph lookup: a missing customs
    /// edge means no customs are charged.
    pub fn weight_or_zero(&self, a: NodeId, b: NodeId) -> Decimal {
        self.adjacency
            .get(&a)
            .and_then(|neighbors| neighbors.get(&b))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Check whether every node is reachable from every other node.
    ///
    /// An empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.adjacency.keys().next() else {
            return true;
        };

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = self.adjacency.get(&current) {
                for &neighbor in neighbors.keys() {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        visited.len() == self.adjacency.len()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn make_triangle() -> TradeGraph {
        let mut graph = TradeGraph::new();
        for id in 0..3 {
            let _ = graph.add_node(NodeId(id));
        }
        let _ = graph.add_edge(NodeId(0), NodeId(1), dec!(3));
        let _ = graph.add_edge(NodeId(1), NodeId(2), dec!(5.5));
        let _ = graph.add_edge(NodeId(0), NodeId(2), dec!(10));
        graph
    }

    #[test]
    fn counts_nodes_and_edges() {
        let graph = make_triangle();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut graph = TradeGraph::new();
        assert!(graph.add_node(NodeId(1)).is_ok());
        assert!(matches!(
            graph.add_node(NodeId(1)),
            Err(WorldError::DuplicateNode(NodeId(1)))
        ));
        graph.ensure_node(NodeId(1));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn weight_lookup_is_symmetric() {
        let graph = make_triangle();
        assert_eq!(graph.weight(NodeId(1), NodeId(2)).ok(), Some(dec!(5.5)));
        assert_eq!(graph.weight(NodeId(2), NodeId(1)).ok(), Some(dec!(5.5)));
    }

    #[test]
    fn edge_requires_existing_endpoints() {
        let mut graph = TradeGraph::new();
        let _ = graph.add_node(NodeId(0));
        assert!(matches!(
            graph.add_edge(NodeId(0), NodeId(9), dec!(1)),
            Err(WorldError::NodeNotFound(NodeId(9)))
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut graph = make_triangle();
        let result = graph.add_edge(NodeId(0), NodeId(1), dec!(-1));
        assert!(matches!(result, Err(WorldError::NegativeWeight { .. })));
        // The old weight is untouched.
        assert_eq!(graph.weight(NodeId(0), NodeId(1)).ok(), Some(dec!(3)));
    }

    #[test]
    fn readding_edge_replaces_weight() {
        let mut graph = make_triangle();
        let previous = graph.add_edge(NodeId(1), NodeId(0), dec!(7));
        assert_eq!(previous.ok().flatten(), Some(dec!(3)));
        assert_eq!(graph.weight(NodeId(0), NodeId(1)).ok(), Some(dec!(7)));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn neighbors_of_unknown_node_is_an_error() {
        let graph = make_triangle();
        assert!(graph.neighbors(NodeId(42)).is_err());
        assert_eq!(
            graph.neighbors(NodeId(0)).unwrap_or_default(),
            vec![NodeId(1), NodeId(2)]
        );
    }

    #[test]
    fn missing_edge_is_an_error_but_zero_for_customs() {
        let mut graph = make_triangle();
        let _ = graph.add_node(NodeId(3));
        assert!(matches!(
            graph.weight(NodeId(0), NodeId(3)),
            Err(WorldError::EdgeNotFound { .. })
        ));
        assert_eq!(graph.weight_or_zero(NodeId(0), NodeId(3)), Decimal::ZERO);
        assert_eq!(graph.weight_or_zero(NodeId(77), NodeId(78)), Decimal::ZERO);
    }

    #[test]
    fn connectivity() {
        let mut graph = make_triangle();
        assert!(graph.is_connected());
        let _ = graph.add_node(NodeId(3));
        assert!(!graph.is_connected());
        assert!(TradeGraph::new().is_connected());
    }
}
