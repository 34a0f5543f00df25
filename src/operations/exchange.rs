//! `ExchangeNodeReplacement`: splits every exchange node into a forget node
//! stacked on an introduce node.

use crate::bag::Bag;
use crate::cancellation::TerminationSignal;
use crate::decomposition::MutableTreeDecomposition;
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::NodeId;
use crate::operations::framework::{label_new_node, ManipulationOperation, OperationMetadata, OperationReport};
use crate::operations::labeling_function::LabelingFunction;

/// Replaces every exchange node `v` (single child `c`, neither `bag(v) ⊋
/// bag(c)` nor `bag(v) ⊊ bag(c)`) with `v → m → c`, where `m`'s bag is
/// `bag(v) ∩ bag(c)`. After the pass every non-join node is a pure introduce
/// or pure forget relative to its single child.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeNodeReplacement;

impl ManipulationOperation for ExchangeNodeReplacement {
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
        let mut nodes: Vec<NodeId> = decomposition.node_ids().collect();
        nodes.sort_by_key(|n| n.0);
        self.apply_to_nodes(graph, decomposition, nodes, labeling_functions, signal)
    }

    fn apply_local(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        relevant_vertices: &[NodeId],
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut nodes: Vec<NodeId> = relevant_vertices.to_vec();
        nodes.sort_by_key(|n| n.0);
        nodes.dedup();
        self.apply_to_nodes(graph, decomposition, nodes, labeling_functions, signal)
    }
}

impl ExchangeNodeReplacement {
    fn apply_to_nodes(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        nodes: Vec<NodeId>,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = OperationReport::default();
        for v in nodes {
            if signal.is_terminated() {
                break;
            }
            if !decomposition.contains_node(v) {
                continue;
            }
            let children = decomposition.children(v)?.to_vec();
            if children.len() != 1 {
                continue;
            }
            let c = children[0];
            if !decomposition.is_exchange_node(v)? {
                continue;
            }

            let intersection = decomposition.remembered_vertices_relative_to(v, c)?;
            let m = decomposition.add_child(v)?;
            decomposition.set_bag(graph, m, Bag::new(intersection))?;
            label_new_node(graph, decomposition, m, labeling_functions)?;
            decomposition.set_parent(c, m)?;
            report.created.push(m);
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
    fn exchange_node_replacement_on_chain() {
        let mut g = SimpleHypergraph::new();
        for i in 1..=4 {
            g.add_vertex(v(i));
        }
        // p(bag={a,b}) -> c(bag={b,d}) with a=1, b=2, d=4.
        let mut d = MutableTreeDecomposition::new(&g, Bag::new([v(1), v(2)])).unwrap();
        let p = d.root();
        let c = d.add_child(p).unwrap();
        d.set_bag(&g, c, Bag::new([v(2), v(4)])).unwrap();
        assert!(d.is_exchange_node(p).unwrap());

        let op = ExchangeNodeReplacement;
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        assert_eq!(report.created.len(), 1);
        let m = report.created[0];
        assert_eq!(d.children(p).unwrap(), &[m]);
        assert_eq!(d.children(m).unwrap(), &[c]);
        assert_eq!(d.bag(m).unwrap().as_slice(), &[v(2)]);
        assert!(d.is_introduce_relative_to(p, m).unwrap());
        assert!(d.is_forget_relative_to(m, c).unwrap());
    }

    #[test]
    fn exchange_node_replacement_noop_on_introduce_chain() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(v(1));
        g.add_vertex(v(2));
        let mut d = MutableTreeDecomposition::new(&g, Bag::new([v(1), v(2)])).unwrap();
        let p = d.root();
        let c = d.add_child(p).unwrap();
        d.set_bag(&g, c, Bag::new([v(1)])).unwrap();

        let op = ExchangeNodeReplacement;
        let sig = TerminationSignal::new();
        let report = op.apply(&g, &mut d, &[], &sig).unwrap();

        assert!(report.created.is_empty());
        assert_eq!(d.children(p).unwrap(), &[c]);
    }
}
