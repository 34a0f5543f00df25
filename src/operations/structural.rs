//! Structural primitive operations: `AddEmptyRoot`, `AddEmptyLeaves`, and
//! `LimitChildCount`.

use crate::bag::Bag;
use crate::cancellation::TerminationSignal;
use crate::decomposition::MutableTreeDecomposition;
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::NodeId;
use crate::operations::framework::{label_new_node, ManipulationOperation, OperationMetadata, OperationReport};
use crate::operations::labeling_function::LabelingFunction;

/// If the root's bag is non-empty, inserts a new root with an empty bag above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddEmptyRoot;

impl ManipulationOperation for AddEmptyRoot {
    fn metadata(&self) -> OperationMetadata {
        OperationMetadata {
            is_local: false,
            creates_nodes: true,
            removes_nodes: false,
            modifies_bags: false,
            creates_subset_maximal_bags: false,
            creates_location_dependent_labels: false,
        }
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        _signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let root = decomposition.root();
        if decomposition.bag(root)?.is_empty() {
            return Ok(OperationReport::default());
        }
        let new_root = decomposition.add_parent(root)?;
        decomposition.set_bag(graph, new_root, Bag::empty())?;
        label_new_node(graph, decomposition, new_root, labeling_functions)?;
        Ok(OperationReport {
            created: vec![new_root],
            removed: Vec::new(),
        })
    }
}

/// For every leaf with a non-empty bag, adds a single empty-bag child.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddEmptyLeaves;

impl ManipulationOperation for AddEmptyLeaves {
    fn metadata(&self) -> OperationMetadata {
        OperationMetadata {
            is_local: true,
            creates_nodes: true,
            removes_nodes: false,
            modifies_bags: false,
            creates_subset_maximal_bags: false,
            creates_location_dependent_labels: false,
        }
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut leaves: Vec<NodeId> = decomposition
            .node_ids()
            .filter(|&n| decomposition.is_leaf(n).unwrap_or(false))
            .collect();
        leaves.sort_by_key(|n| n.0);

        let mut report = OperationReport::default();
        for leaf in leaves {
            if signal.is_terminated() {
                break;
            }
            if decomposition.bag(leaf)?.is_empty() {
                continue;
            }
            let child = decomposition.add_child(leaf)?;
            label_new_node(graph, decomposition, child, labeling_functions)?;
            report.created.push(child);
        }
        Ok(report)
    }

    fn apply_local(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        relevant_vertices: &[NodeId],
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut leaves: Vec<NodeId> = relevant_vertices
            .iter()
            .copied()
            .filter(|&n| decomposition.is_leaf(n).unwrap_or(false))
            .collect();
        leaves.sort_by_key(|n| n.0);
        leaves.dedup();

        let mut report = OperationReport::default();
        for leaf in leaves {
            if signal.is_terminated() {
                break;
            }
            if decomposition.bag(leaf)?.is_empty() {
                continue;
            }
            let child = decomposition.add_child(leaf)?;
            label_new_node(graph, decomposition, child, labeling_functions)?;
            report.created.push(child);
        }
        Ok(report)
    }
}

/// Bounds every join node's child count to at most `k` by inserting a chain
/// of intermediate nodes. `k < 2` is rejected at construction: tracing the
/// original's chain-building loop with `limit_ = 1` shows the inner
/// re-parent range and the index advance both become zero-length, so the
/// loop never terminates for any join node with more than one child.
#[derive(Debug, Clone, Copy)]
pub struct LimitChildCount {
    k: usize,
}

impl LimitChildCount {
    pub fn new(k: usize) -> Result<Self, DecompError> {
        if k < 2 {
            return Err(DecompError::InvalidParameter {
                parameter: "k",
                reason: "LimitChildCount requires k >= 2 (k=1 never terminates)".to_string(),
            });
        }
        Ok(LimitChildCount { k })
    }

    fn apply_at(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        v: NodeId,
        labeling_functions: &[&dyn LabelingFunction],
        report: &mut OperationReport,
    ) -> Result<(), DecompError> {
        let children = decomposition.children(v)?.to_vec();
        let n = children.len();
        let k = self.k;
        if n <= k {
            return Ok(());
        }
        let bag = decomposition.bag(v)?.clone();

        let keep = k - 1;
        let mut i = keep;
        let mut a = v;

        while n - i > k {
            let new_node = decomposition.add_child(a)?;
            decomposition.set_bag(graph, new_node, bag.clone())?;
            label_new_node(graph, decomposition, new_node, labeling_functions)?;
            report.created.push(new_node);

            for &c in &children[i..i + keep] {
                decomposition.set_parent(c, new_node)?;
            }
            i += keep;
            a = new_node;
        }

        if i < n {
            let last_node = decomposition.add_child(a)?;
            decomposition.set_bag(graph, last_node, bag.clone())?;
            label_new_node(graph, decomposition, last_node, labeling_functions)?;
            report.created.push(last_node);

            for &c in &children[i..n] {
                decomposition.set_parent(c, last_node)?;
            }
        }
        Ok(())
    }
}

impl ManipulationOperation for LimitChildCount {
    fn metadata(&self) -> OperationMetadata {
        OperationMetadata {
            is_local: true,
            creates_nodes: true,
            removes_nodes: false,
            modifies_bags: false,
            creates_subset_maximal_bags: false,
            creates_location_dependent_labels: false,
        }
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut join_nodes: Vec<NodeId> = decomposition
            .node_ids()
            .filter(|&n| decomposition.is_join(n).unwrap_or(false))
            .collect();
        join_nodes.sort_by_key(|n| n.0);
        self.apply_to_nodes(graph, decomposition, join_nodes, labeling_functions, signal)
    }

    fn apply_local(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        relevant_vertices: &[NodeId],
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut join_nodes: Vec<NodeId> = relevant_vertices
            .iter()
            .copied()
            .filter(|&n| decomposition.is_join(n).unwrap_or(false))
            .collect();
        join_nodes.sort_by_key(|n| n.0);
        join_nodes.dedup();
        self.apply_to_nodes(graph, decomposition, join_nodes, labeling_functions, signal)
    }
}

impl LimitChildCount {
    fn apply_to_nodes(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        join_nodes: Vec<NodeId>,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = OperationReport::default();
        for v in join_nodes {
            if signal.is_terminated() {
                break;
            }
            if !decomposition.contains_node(v) {
                continue;
            }
            self.apply_at(graph, decomposition, v, labeling_functions, &mut report)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergraph::SimpleHypergraph;
    use crate::id::VertexId;

    fn v(n: u32) -> VertexId {
        VertexId(n)
    }

    #[test]
    fn limit_child_count_rejects_k_below_two() {
        assert!(LimitChildCount::new(0).is_err());
        assert!(LimitChildCount::new(1).is_err());
        assert!(LimitChildCount::new(2).is_ok());
    }

    #[test]
    fn add_empty_root_on_singleton() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(v(1));
        g.add_vertex(v(2));
        let mut d = MutableTreeDecomposition::new(&g, Bag::new([v(1), v(2)])).unwrap();
        let old_root = d.root();

        let op = AddEmptyRoot;
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(d.node_count(), 2);
        let new_root = d.root();
        assert_ne!(new_root, old_root);
        assert!(d.bag(new_root).unwrap().is_empty());
        assert_eq!(d.bag(old_root).unwrap().as_slice(), &[v(1), v(2)]);
        assert_eq!(d.children(new_root).unwrap(), &[old_root]);
    }

    #[test]
    fn add_empty_root_is_noop_on_empty_root() {
        let g = SimpleHypergraph::new();
        let mut d = MutableTreeDecomposition::new(&g, Bag::empty()).unwrap();

        let op = AddEmptyRoot;
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(d.node_count(), 1);
    }

    #[test]
    fn add_empty_leaves_only_on_nonempty_leaf() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(v(1));
        g.add_vertex(v(2));
        let mut d = MutableTreeDecomposition::new(&g, Bag::new([v(1)])).unwrap();
        let r = d.root();
        let c = d.add_child(r).unwrap();
        d.set_bag(&g, c, Bag::new([v(1), v(2)])).unwrap();

        let op = AddEmptyLeaves;
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        // Only `c` is a leaf (r has a child), and its bag is non-empty.
        assert_eq!(report.created.len(), 1);
        let new_leaf = report.created[0];
        assert_eq!(d.parent(new_leaf).unwrap(), Some(c));
        assert!(d.bag(new_leaf).unwrap().is_empty());
    }

    #[test]
    fn limit_child_count_on_star() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(v(1));
        let mut d = MutableTreeDecomposition::new(&g, Bag::empty()).unwrap();
        let root = d.root();
        let c2 = d.add_child(root).unwrap();
        let c3 = d.add_child(root).unwrap();
        let c4 = d.add_child(root).unwrap();
        let c5 = d.add_child(root).unwrap();
        for c in [c2, c3, c4, c5] {
            d.set_bag(&g, c, Bag::new([v(1)])).unwrap();
        }

        let op = LimitChildCount::new(2).unwrap();
        let sig = TerminationSignal::new();
        op.apply(&g, &mut d, &[], &sig).unwrap();

        let root_children = d.children(root).unwrap().to_vec();
        assert_eq!(root_children.len(), 2);
        assert_eq!(root_children[0], c2);
        let n6 = root_children[1];

        let n6_children = d.children(n6).unwrap().to_vec();
        assert_eq!(n6_children.len(), 2);
        assert_eq!(n6_children[0], c3);
        let n7 = n6_children[1];

        let n7_children = d.children(n7).unwrap().to_vec();
        assert_eq!(n7_children, vec![c4, c5]);

        for new_node in [n6, n7] {
            assert!(d.bag(new_node).unwrap().is_empty());
        }
    }

    #[test]
    fn limit_child_count_leaves_small_join_nodes_untouched() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(v(1));
        let mut d = MutableTreeDecomposition::new(&g, Bag::empty()).unwrap();
        let root = d.root();
        let c1 = d.add_child(root).unwrap();
        let c2 = d.add_child(root).unwrap();

        let op = LimitChildCount::new(2).unwrap();
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(d.children(root).unwrap(), &[c1, c2]);
    }
}
