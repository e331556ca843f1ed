//! Edge-list loading.
//!
//! Network files are `;`-separated lines of `source;target;weight`, with
//! node ids possibly written as decimals (`3.0`). A leading UTF-8 byte
//! order mark and blank lines are ignored. Every endpoint mentioned is
//! added as a node.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;
use tradenet_types::NodeId;

use crate::error::WorldError;
use crate::graph::TradeGraph;

/// Field separator used by network files.
const SEPARATOR: char = ';';

/// Read and parse an edge-list file.
///
/// # Errors
///
/// Returns [`WorldError::Io`] if the file cannot be read, or any error
/// from [`parse_edge_list`].
pub fn load_edge_list(path: &Path) -> Result<TradeGraph, WorldError> {
    let contents = std::fs::read_to_string(path)?;
    let graph = parse_edge_list(&contents)?;
    debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Edge list loaded"
    );
    Ok(graph)
}

/// Parse edge-list text into a graph.
///
/// # Errors
///
/// Returns [`WorldError::MalformedEdgeLine`] for a line without exactly
/// three fields, a non-numeric field, or a fractional/negative node id,
/// and [`WorldError::NegativeWeight`] for a negative weight.
pub fn parse_edge_list(text: &str) -> Result<TradeGraph, WorldError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut graph = TradeGraph::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index.saturating_add(1);
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
        let [source, target, weight] = fields.as_slice() else {
            return Err(WorldError::MalformedEdgeLine {
                line: line_no,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let source = parse_node(source, line_no)?;
        let target = parse_node(target, line_no)?;
        let weight = parse_decimal(weight, line_no)?;

        graph.ensure_node(source);
        graph.ensure_node(target);
        graph.add_edge(source, target, weight)?;
    }

    Ok(graph)
}

fn parse_decimal(field: &str, line: usize) -> Result<Decimal, WorldError> {
    Decimal::from_str(field).map_err(|e| WorldError::MalformedEdgeLine {
        line,
        reason: format!("`{field}` is not a number: {e}"),
    })
}

fn parse_node(field: &str, line: usize) -> Result<NodeId, WorldError> {
    let value = parse_decimal(field, line)?;
    if !value.fract().is_zero() {
        return Err(WorldError::MalformedEdgeLine {
            line,
            reason: format!("node id `{field}` is not an integer"),
        });
    }
    value
        .to_u64()
        .map(NodeId)
        .ok_or_else(|| WorldError::MalformedEdgeLine {
            line,
            reason: format!("node id `{field}` is out of range"),
        })
}
