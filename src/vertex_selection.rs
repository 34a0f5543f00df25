//! The vertex-selection-strategy contract: produces the candidate set of
//! root vertices (decomposition node ids) the optimizer tries re-rooting at.
//! The library uses the returned order as the preference order for ties.

use crate::decomposition::MutableTreeDecomposition;
use crate::hypergraph::Hypergraph;
use crate::id::NodeId;

pub trait VertexSelectionStrategy {
    fn select(&self, graph: &dyn Hypergraph, decomposition: &MutableTreeDecomposition) -> Vec<NodeId>;
}

/// Selects every node of the decomposition as a candidate root, in ascending
/// id order -- the testable canonical default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllNodesAscending;

impl VertexSelectionStrategy for AllNodesAscending {
    fn select(&self, _graph: &dyn Hypergraph, decomposition: &MutableTreeDecomposition) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = decomposition.node_ids().collect();
        ids.sort_by_key(|n| n.0);
        ids
    }
}
