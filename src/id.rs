//! Stable ID newtypes for graph vertices/edges and decomposition nodes.
//!
//! All IDs are distinct newtype wrappers over `u32`, so a `VertexId` cannot
//! be accidentally used where a `NodeId` is expected.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Identifier for a vertex of the input hypergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Identifier for a hyperedge of the input hypergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Identifier for a node of a decomposition tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridge between NodeId and petgraph's NodeIndex<u32>, used by the induced
// hyperedge bookkeeping in `hypergraph`.

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(42);
        let node_id = NodeId::from(idx);
        assert_eq!(node_id.0, 42);

        let back: NodeIndex<u32> = node_id.into();
        assert_eq!(back.index(), 42);
    }

    #[test]
    fn display_impls() {
        assert_eq!(format!("{}", VertexId(7)), "7");
        assert_eq!(format!("{}", EdgeId(3)), "3");
        assert_eq!(format!("{}", NodeId(0)), "0");
    }

    #[test]
    fn id_types_are_distinct() {
        let v = VertexId(1);
        let e = EdgeId(1);
        let n = NodeId(1);
        assert_eq!(v.0, e.0);
        assert_eq!(e.0, n.0);
    }

    #[test]
    fn ordering_is_by_inner_value() {
        assert!(VertexId(1) < VertexId(2));
        assert!(NodeId(5) > NodeId(3));
    }

    #[test]
    fn serde_roundtrip() {
        let v = VertexId(42);
        let json = serde_json::to_string(&v).unwrap();
        let back: VertexId = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);

        let n = NodeId(7);
        let json = serde_json::to_string(&n).unwrap();
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(n, back);
    }
}
