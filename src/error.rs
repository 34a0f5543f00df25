//! Core error types for treedecomp-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! three failure kinds named by the error-handling design: invalid
//! parameter, invariant-violation attempt, and unknown-id lookups. There is
//! deliberately no `Cancellation` variant — cooperative termination returns
//! `Ok` with a partially-rewritten decomposition, never an error.

use thiserror::Error;

use crate::id::{EdgeId, NodeId, VertexId};

/// Errors produced by the decomposition core.
#[derive(Debug, Error)]
pub enum DecompError {
    /// A decomposition node id was not found.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// A graph vertex id referenced by an operation is not in the bag/graph.
    #[error("vertex not found: VertexId({id})", id = id.0)]
    VertexNotFound { id: VertexId },

    /// A graph edge id is unknown.
    #[error("edge not found: EdgeId({id})", id = id.0)]
    EdgeNotFound { id: EdgeId },

    /// A label name was not registered in the labeling collection.
    #[error("unknown label name: '{name}'")]
    UnknownLabelName { name: String },

    /// A configuration parameter was out of its legal range, e.g. `limit=0`
    /// or `LimitChildCount(1)` (see design notes on why `k<2` is rejected).
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    /// The vertex-selection strategy produced an empty candidate set while a
    /// fitness function was configured.
    #[error("empty root candidate set")]
    EmptyCandidateSet,

    /// `set_parent(c, p)` or `swap_subtrees(a, b)` would create a cycle.
    #[error("operation would create a cycle: {reason}")]
    WouldCreateCycle { reason: String },

    /// `remove_node` was called on the root with a child count other than 1.
    #[error("cannot remove root with {child_count} children (need exactly 1)")]
    InvalidRootRemoval { child_count: usize },

    /// A bag contained a vertex not present in the input graph (I4).
    #[error("bag for NodeId({node}) contains vertex not in graph: VertexId({vertex})",
        node = node.0, vertex = vertex.0)]
    VertexNotInGraph { node: NodeId, vertex: VertexId },
}
