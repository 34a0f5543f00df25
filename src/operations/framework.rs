//! The manipulation-operation contract: declarative metadata flags plus the
//! two invocation shapes (full pass / local pass) every primitive operation
//! implements.
//!
//! Re-expresses the original's deeply virtual operation-interface hierarchy
//! (`ITreeDecompositionManipulationOperation` and friends) as a single Rust
//! trait plus a plain metadata struct, instead of a chain of marker
//! interfaces -- each primitive operation below is one type implementing
//! `ManipulationOperation` and reporting a fixed answer for every flag.

use crate::cancellation::TerminationSignal;
use crate::decomposition::MutableTreeDecomposition;
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::NodeId;
use crate::operations::labeling_function::LabelingFunction;

/// Declarative metadata flags consumed by the optimization operation to
/// decide whether it may re-apply an operation cheaply after re-rooting.
///
/// These correspond 1:1 to the six pure-virtual query methods on the
/// original `...Operation` headers (`isLocalOperation`, `createsTreeNodes`,
/// `removesTreeNodes`, `modifiesBagContents`, `createsSubsetMaximalBags`,
/// `createsLocationDependendLabels`). Every operation below reports a fixed
/// answer, not one computed from its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationMetadata {
    pub is_local: bool,
    pub creates_nodes: bool,
    pub removes_nodes: bool,
    pub modifies_bags: bool,
    pub creates_subset_maximal_bags: bool,
    pub creates_location_dependent_labels: bool,
}

impl OperationMetadata {
    /// Safe per §4.4: local, non-bag-modifying, non-node-removing, and not
    /// producing location-dependent labels -- re-applicable after a local
    /// re-rooting without global recomputation.
    pub fn is_safe(&self) -> bool {
        self.is_local
            && !self.removes_nodes
            && !self.modifies_bags
            && !self.creates_location_dependent_labels
    }
}

/// The nodes an operation application created and removed, in application
/// order -- required output of both invocation shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationReport {
    pub created: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl OperationReport {
    pub fn merge(&mut self, other: OperationReport) {
        self.created.extend(other.created);
        self.removed.extend(other.removed);
    }
}

/// A manipulation operation: a rewrite rule over a decomposition, with an
/// optional restriction to a neighborhood of `relevant_vertices` when the
/// operation declares itself local.
pub trait ManipulationOperation {
    fn metadata(&self) -> OperationMetadata;

    /// Full pass over the decomposition. Every created node is passed
    /// through `labeling_functions`, in list order.
    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError>;

    /// Local pass restricted to `relevant_vertices` and their immediate
    /// surroundings. Only legal when `metadata().is_local`.
    fn apply_local(
        &self,
        _graph: &dyn Hypergraph,
        _decomposition: &mut MutableTreeDecomposition,
        _relevant_vertices: &[NodeId],
        _labeling_functions: &[&dyn LabelingFunction],
        _signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        Err(DecompError::InvalidParameter {
            parameter: "relevant_vertices",
            reason: "operation does not declare itself local".to_string(),
        })
    }
}

/// Invokes every labeling function on a freshly created node, storing each
/// result in that node's own label map.
pub(crate) fn label_new_node(
    graph: &dyn Hypergraph,
    decomposition: &mut MutableTreeDecomposition,
    node: NodeId,
    labeling_functions: &[&dyn LabelingFunction],
) -> Result<(), DecompError> {
    let bag = decomposition.bag(node)?.clone();
    for f in labeling_functions {
        let node_labels = decomposition.node_label_map_snapshot(node)?;
        let value = f.compute(graph, &bag, &node_labels);
        decomposition.set_node_label(node, f.name(), value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_safe_requires_all_four_conditions() {
        let safe = OperationMetadata {
            is_local: true,
            creates_nodes: true,
            removes_nodes: false,
            modifies_bags: false,
            creates_subset_maximal_bags: false,
            creates_location_dependent_labels: false,
        };
        assert!(safe.is_safe());

        let unsafe_removes = OperationMetadata {
            removes_nodes: true,
            ..safe
        };
        assert!(!unsafe_removes.is_safe());

        let unsafe_not_local = OperationMetadata {
            is_local: false,
            ..safe
        };
        assert!(!unsafe_not_local.is_safe());
    }

    #[test]
    fn operation_report_merge_appends_in_order() {
        let mut a = OperationReport {
            created: vec![NodeId(1)],
            removed: vec![],
        };
        let b = OperationReport {
            created: vec![NodeId(2)],
            removed: vec![NodeId(3)],
        };
        a.merge(b);
        assert_eq!(a.created, vec![NodeId(1), NodeId(2)]);
        assert_eq!(a.removed, vec![NodeId(3)]);
    }
}
