//! `LimitMaximumIntroducedVertexCount` and `LimitMaximumForgottenVertexCount`:
//! split wide introduce/forget steps into chains bounded by `k` vertices
//! each, in ascending-vertex-id chunk order (the testable canonical choice
//! the spec allows among fixed orderings).

use crate::bag::Bag;
use crate::cancellation::TerminationSignal;
use crate::decomposition::MutableTreeDecomposition;
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::{NodeId, VertexId};
use crate::operations::framework::{label_new_node, ManipulationOperation, OperationMetadata, OperationReport};
use crate::operations::labeling_function::LabelingFunction;

fn check_k(k: usize) -> Result<(), DecompError> {
    if k == 0 {
        return Err(DecompError::InvalidParameter {
            parameter: "k",
            reason: "k must be >= 1".to_string(),
        });
    }
    Ok(())
}

/// Bounds every introduce node's vertex count relative to its child to `k`.
#[derive(Debug, Clone, Copy)]
pub struct LimitMaximumIntroducedVertexCount {
    k: usize,
    treat_leaves_as_introduce: bool,
}

impl LimitMaximumIntroducedVertexCount {
    pub fn new(k: usize, treat_leaves_as_introduce: bool) -> Result<Self, DecompError> {
        check_k(k)?;
        Ok(LimitMaximumIntroducedVertexCount {
            k,
            treat_leaves_as_introduce,
        })
    }

    /// Inserts the chain between existing `v` and existing `c`, given the
    /// diff `bag(v) \ bag(c)` in ascending order. Builds bottom-up from `c`:
    /// each new node inherits the previous cumulative bag plus one more
    /// chunk, so the node nearest `c` carries the smallest increment and the
    /// node nearest `v` carries the largest (the final chunk is not given
    /// its own node, since its cumulative bag equals `bag(v)` already).
    fn build_chain(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        c: NodeId,
        bag_c: &Bag,
        diff: &[VertexId],
        labeling_functions: &[&dyn LabelingFunction],
        created: &mut Vec<NodeId>,
    ) -> Result<(), DecompError> {
        let chunks: Vec<&[VertexId]> = diff.chunks(self.k).collect();
        let mut running = bag_c.clone();
        let mut anchor = c;
        for chunk in &chunks[..chunks.len() - 1] {
            running = running.union(&Bag::new(chunk.iter().copied()));
            let new_node = decomposition.add_parent(anchor)?;
            decomposition.set_bag(graph, new_node, running.clone())?;
            label_new_node(graph, decomposition, new_node, labeling_functions)?;
            created.push(new_node);
            anchor = new_node;
        }
        Ok(())
    }
}

impl ManipulationOperation for LimitMaximumIntroducedVertexCount {
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

impl LimitMaximumIntroducedVertexCount {
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

            if children.is_empty() {
                if !self.treat_leaves_as_introduce {
                    continue;
                }
                if decomposition.bag(v)?.len() <= self.k {
                    continue;
                }
                let child = decomposition.add_child(v)?;
                label_new_node(graph, decomposition, child, labeling_functions)?;
                report.created.push(child);

                let diff = decomposition.bag(v)?.as_slice().to_vec();
                self.build_chain(
                    graph,
                    decomposition,
                    child,
                    &Bag::empty(),
                    &diff,
                    labeling_functions,
                    &mut report.created,
                )?;
                continue;
            }

            if children.len() != 1 {
                continue;
            }
            let c = children[0];
            if !decomposition.is_introduce_relative_to(v, c)? {
                continue;
            }
            let diff = decomposition.introduced_vertices_relative_to(v, c)?;
            if diff.len() <= self.k {
                continue;
            }
            let bag_c = decomposition.bag(c)?.clone();
            self.build_chain(graph, decomposition, c, &bag_c, &diff, labeling_functions, &mut report.created)?;
        }
        Ok(report)
    }
}

/// Bounds every forget node's vertex count relative to its child to `k`.
/// Symmetric to [`LimitMaximumIntroducedVertexCount`]: the chain grows
/// downward from `v` instead of upward from `c`.
#[derive(Debug, Clone, Copy)]
pub struct LimitMaximumForgottenVertexCount {
    k: usize,
}

impl LimitMaximumForgottenVertexCount {
    pub fn new(k: usize) -> Result<Self, DecompError> {
        check_k(k)?;
        Ok(LimitMaximumForgottenVertexCount { k })
    }

    /// Builds the chain between existing `v` and existing `c` given the diff
    /// `bag(c) \ bag(v)` in ascending order. Grows downward from `v`: each
    /// new node is a child of the previous anchor, cumulative bag growing by
    /// one chunk at a time, until the final chunk is reached, at which point
    /// `c` (already carrying the full bag) is reparented under the chain.
    fn build_chain(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        v: NodeId,
        c: NodeId,
        bag_v: &Bag,
        diff: &[VertexId],
        labeling_functions: &[&dyn LabelingFunction],
        created: &mut Vec<NodeId>,
    ) -> Result<(), DecompError> {
        let chunks: Vec<&[VertexId]> = diff.chunks(self.k).collect();
        let mut running = bag_v.clone();
        let mut anchor = v;
        for chunk in &chunks[..chunks.len() - 1] {
            running = running.union(&Bag::new(chunk.iter().copied()));
            let new_node = decomposition.add_child(anchor)?;
            decomposition.set_bag(graph, new_node, running.clone())?;
            label_new_node(graph, decomposition, new_node, labeling_functions)?;
            created.push(new_node);
            anchor = new_node;
        }
        decomposition.set_parent(c, anchor)?;
        Ok(())
    }
}

impl ManipulationOperation for LimitMaximumForgottenVertexCount {
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

impl LimitMaximumForgottenVertexCount {
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
            if !decomposition.is_forget_relative_to(v, c)? {
                continue;
            }
            let diff = decomposition.forgotten_vertices_relative_to(v, c)?;
            if diff.len() <= self.k {
                continue;
            }
            let bag_v = decomposition.bag(v)?.clone();
            self.build_chain(graph, decomposition, v, c, &bag_v, &diff, labeling_functions, &mut report.created)?;
        }
        Ok(report)
    }
}
