//! Error types for the `tradenet-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`]. Every
//! variant signals a construction-time invariant violation; none of them
//! describe an ordinary simulation condition.

use tradenet_types::NodeId;

/// Errors that can occur during graph construction, lookup, or loading.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A node was not found in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// No edge connects the two nodes.
    #[error("no edge between {from} and {to}")]
    EdgeNotFound {
        /// One endpoint.
        from: NodeId,
        /// The other endpoint.
        to: NodeId,
    },

    /// A node was inserted twice.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Edge weights must be non-negative.
    #[error("negative weight {weight} on edge {from}-{to}")]
    NegativeWeight {
        /// One endpoint.
        from: NodeId,
        /// The other endpoint.
        to: NodeId,
        /// The rejected weight, as written.
        weight: String,
    },

    /// A line of an edge-list file could not be parsed.
    #[error("malformed edge list line {line}: {reason}")]
    MalformedEdgeLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The region catalog is inconsistent.
    #[error("invalid region catalog: {reason}")]
    InvalidRegion {
        /// What was wrong with it.
        reason: String,
    },

    /// A region type id was not found in the catalog.
    #[error("unknown region type id: {0}")]
    UnknownRegion(u32),

    /// Reading an edge-list file failed.
    #[error("failed to read edge list: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
