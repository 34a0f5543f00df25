//! Copy-on-write bag and induced-hyperedge handles.
//!
//! A `Bag` is the sorted, duplicate-free vertex set attached to a
//! decomposition node. `LimitChildCount` and friends duplicate a parent's
//! bag onto many freshly created nodes, so the backing storage is shared
//! via `Arc` until one of them is rewritten through `set_bag`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hypergraph::Hyperedge;
use crate::id::{EdgeId, VertexId};

/// A node's bag: a sorted, duplicate-free set of vertex ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag(Arc<[VertexId]>);

impl Bag {
    /// Builds a bag from arbitrary vertex ids, sorting and deduplicating.
    pub fn new(vertices: impl IntoIterator<Item = VertexId>) -> Self {
        let mut v: Vec<VertexId> = vertices.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Bag(Arc::from(v))
    }

    pub fn empty() -> Self {
        Bag(Arc::from([]))
    }

    pub fn as_slice(&self) -> &[VertexId] {
        &self.0
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.0.binary_search(&v).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self ⊋ other` (proper superset).
    pub fn strictly_contains(&self, other: &Bag) -> bool {
        other.as_slice().iter().all(|v| self.contains(*v)) && self.len() > other.len()
    }

    /// Vertices in `self` but not in `other`.
    pub fn difference(&self, other: &Bag) -> Vec<VertexId> {
        self.0
            .iter()
            .filter(|v| !other.contains(**v))
            .copied()
            .collect()
    }

    /// Vertices in both `self` and `other`.
    pub fn intersection(&self, other: &Bag) -> Vec<VertexId> {
        self.0
            .iter()
            .filter(|v| other.contains(**v))
            .copied()
            .collect()
    }

    /// Vertices in `self` or `other`, sorted and deduplicated.
    pub fn union(&self, other: &Bag) -> Bag {
        let mut v: Vec<VertexId> = self.0.iter().chain(other.0.iter()).copied().collect();
        v.sort_unstable();
        v.dedup();
        Bag(Arc::from(v))
    }
}

impl Default for Bag {
    fn default() -> Self {
        Bag::empty()
    }
}

/// A node's induced hyperedges: the input edges whose endpoints all lie in
/// the node's bag. Stored as a filtered collection of ids referencing the
/// shared input edge list, with copy-on-write sharing identical to `Bag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InducedEdges(Arc<[EdgeId]>);

impl InducedEdges {
    pub fn empty() -> Self {
        InducedEdges(Arc::from([]))
    }

    /// Recomputes induced edges for `bag` from the full input edge list.
    pub fn compute<'a>(bag: &Bag, edges: impl Iterator<Item = &'a Hyperedge>) -> Self {
        let ids: Vec<EdgeId> = edges
            .filter(|e| e.endpoints_subset_of(bag.as_slice()))
            .map(|e| e.id)
            .collect();
        InducedEdges(Arc::from(ids))
    }

    pub fn as_slice(&self) -> &[EdgeId] {
        &self.0
    }

    pub fn contains(&self, e: EdgeId) -> bool {
        self.0.contains(&e)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for InducedEdges {
    fn default() -> Self {
        InducedEdges::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u32) -> VertexId {
        VertexId(n)
    }

    #[test]
    fn bag_sorts_and_dedups() {
        let b = Bag::new([v(3), v(1), v(2), v(1)]);
        assert_eq!(b.as_slice(), &[v(1), v(2), v(3)]);
    }

    #[test]
    fn bag_strictly_contains() {
        let a = Bag::new([v(1), v(2), v(3)]);
        let b = Bag::new([v(1), v(2)]);
        assert!(a.strictly_contains(&b));
        assert!(!b.strictly_contains(&a));
        assert!(!a.strictly_contains(&a.clone()));
    }

    #[test]
    fn bag_difference_intersection_union() {
        let a = Bag::new([v(1), v(2), v(3)]);
        let b = Bag::new([v(2), v(3), v(4)]);
        assert_eq!(a.difference(&b), vec![v(1)]);
        assert_eq!(a.intersection(&b), vec![v(2), v(3)]);
        assert_eq!(a.union(&b).as_slice(), &[v(1), v(2), v(3), v(4)]);
    }

    #[test]
    fn bag_clone_shares_storage() {
        let a = Bag::new([v(1), v(2)]);
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn induced_edges_computed_from_bag() {
        use crate::hypergraph::Hyperedge;

        let edges = vec![
            Hyperedge::new(EdgeId(1), [v(1), v(2)]),
            Hyperedge::new(EdgeId(2), [v(2), v(3)]),
            Hyperedge::new(EdgeId(3), [v(1), v(3)]),
        ];
        let bag = Bag::new([v(1), v(2)]);
        let induced = InducedEdges::compute(&bag, edges.iter());
        assert_eq!(induced.as_slice(), &[EdgeId(1)]);
    }

    #[test]
    fn induced_edges_empty_for_empty_bag() {
        let induced = InducedEdges::compute(&Bag::empty(), std::iter::empty());
        assert!(induced.is_empty());
    }
}
