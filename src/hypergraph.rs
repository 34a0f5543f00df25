//! Hypergraph read interface consumed by the decomposition core.
//!
//! The core never stores or mutates a hypergraph itself -- it only reads
//! vertices and hyperedges through the [`Hypergraph`] trait. A hyperedge's
//! endpoint multiset may repeat a vertex (a self-loop is legal), so
//! endpoints are stored as an ordered multiset rather than a set.

use smallvec::SmallVec;

use crate::id::{EdgeId, VertexId};

/// A single hyperedge: an id and its (possibly repeating) endpoint multiset.
///
/// Most hyperedges in practice have few endpoints, so the multiset is stored
/// inline up to 4 elements before spilling to the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperedge {
    pub id: EdgeId,
    endpoints: SmallVec<[VertexId; 4]>,
}

impl Hyperedge {
    pub fn new(id: EdgeId, endpoints: impl IntoIterator<Item = VertexId>) -> Self {
        Hyperedge {
            id,
            endpoints: endpoints.into_iter().collect(),
        }
    }

    /// Endpoints in their original (possibly repeating) order.
    pub fn endpoints(&self) -> &[VertexId] {
        &self.endpoints
    }

    /// True if every endpoint of this edge is contained in `bag`.
    ///
    /// `bag` is assumed sorted ascending and duplicate-free (the `Bag`
    /// invariant); containment is checked per endpoint via binary search so
    /// a repeated endpoint does not require repeated membership.
    pub fn endpoints_subset_of(&self, bag: &[VertexId]) -> bool {
        self.endpoints
            .iter()
            .all(|v| bag.binary_search(v).is_ok())
    }

    /// Equality independent of endpoint order: two hyperedges with the same
    /// multiset of endpoints are equal regardless of storage order.
    ///
    /// Grounded in the original's hyperedge-equivalence notion -- storage
    /// order is preserved for callers that care about it, but induced-edge
    /// computation and dedup use this multiset comparison.
    pub fn same_endpoint_multiset(&self, other: &Hyperedge) -> bool {
        let mut a: SmallVec<[VertexId; 4]> = self.endpoints.clone();
        let mut b: SmallVec<[VertexId; 4]> = other.endpoints.clone();
        a.sort();
        b.sort();
        a == b
    }
}

/// Immutable read interface the core needs from an external hypergraph.
///
/// Implementations are not required to be cheap to iterate repeatedly; the
/// core calls these during `set_bag` recomputation and invariant checks.
pub trait Hypergraph {
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;
    fn edges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_>;
    fn vertex_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn contains_vertex(&self, v: VertexId) -> bool;
}

/// A plain in-memory hypergraph, used by tests and as a reference
/// implementation of the [`Hypergraph`] contract.
#[derive(Debug, Clone, Default)]
pub struct SimpleHypergraph {
    vertices: Vec<VertexId>,
    edges: Vec<Hyperedge>,
}

impl SimpleHypergraph {
    pub fn new() -> Self {
        SimpleHypergraph::default()
    }

    pub fn add_vertex(&mut self, v: VertexId) {
        if !self.vertices.contains(&v) {
            self.vertices.push(v);
        }
    }

    pub fn add_edge(&mut self, edge: Hyperedge) {
        for v in edge.endpoints() {
            self.add_vertex(*v);
        }
        self.edges.push(edge);
    }
}

impl Hypergraph for SimpleHypergraph {
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.vertices.iter().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_> {
        Box::new(self.edges.iter())
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u32) -> VertexId {
        VertexId(n)
    }

    #[test]
    fn endpoints_subset_of_bag() {
        let e = Hyperedge::new(EdgeId(1), [v(1), v(3)]);
        assert!(e.endpoints_subset_of(&[v(1), v(2), v(3)]));
        assert!(!e.endpoints_subset_of(&[v(1), v(2)]));
    }

    #[test]
    fn self_loop_endpoint_repeats_allowed() {
        let e = Hyperedge::new(EdgeId(1), [v(5), v(5)]);
        assert_eq!(e.endpoints(), &[v(5), v(5)]);
        assert!(e.endpoints_subset_of(&[v(5)]));
    }

    #[test]
    fn same_endpoint_multiset_ignores_order() {
        let a = Hyperedge::new(EdgeId(1), [v(1), v(2), v(3)]);
        let b = Hyperedge::new(EdgeId(2), [v(3), v(1), v(2)]);
        assert!(a.same_endpoint_multiset(&b));

        let c = Hyperedge::new(EdgeId(3), [v(1), v(2)]);
        assert!(!a.same_endpoint_multiset(&c));
    }

    #[test]
    fn simple_hypergraph_tracks_vertices_and_edges() {
        let mut g = SimpleHypergraph::new();
        g.add_edge(Hyperedge::new(EdgeId(1), [v(1), v(2)]));
        g.add_edge(Hyperedge::new(EdgeId(2), [v(2), v(3)]));

        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_vertex(v(1)));
        assert!(!g.contains_vertex(v(99)));
    }
}
