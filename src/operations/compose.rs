//! Composite operations built from the primitives: `WeakNormalization`,
//! `SemiNormalization`, `NormalizationOperation`, and `CompressionOperation`.

use crate::cancellation::TerminationSignal;
use crate::decomposition::MutableTreeDecomposition;
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::NodeId;
use crate::operations::exchange::ExchangeNodeReplacement;
use crate::operations::framework::{ManipulationOperation, OperationMetadata, OperationReport};
use crate::operations::join::JoinNodeNormalization;
use crate::operations::labeling_function::LabelingFunction;
use crate::operations::structural::{AddEmptyLeaves, AddEmptyRoot, LimitChildCount};
use crate::operations::width::{LimitMaximumForgottenVertexCount, LimitMaximumIntroducedVertexCount};

fn pipeline_metadata() -> OperationMetadata {
    // Conservative aggregate: `AddEmptyRoot`/`CompressionOperation` touch the
    // whole tree, so a composition that may include them is never reported
    // safe for the quick-optimization path.
    OperationMetadata {
        is_local: false,
        creates_nodes: true,
        removes_nodes: false,
        modifies_bags: false,
        creates_subset_maximal_bags: false,
        creates_location_dependent_labels: false,
    }
}

/// Pipeline: `LimitChildCount(2)` -> (if `empty_root`) `AddEmptyRoot` -> (if
/// `empty_leaves`) `AddEmptyLeaves` -> `JoinNodeNormalization(identical_join_parent)`.
#[derive(Debug, Clone, Copy)]
pub struct WeakNormalization {
    pub empty_root: bool,
    pub empty_leaves: bool,
    pub identical_join_parent: bool,
}

impl WeakNormalization {
    pub fn new(empty_root: bool, empty_leaves: bool, identical_join_parent: bool) -> Self {
        WeakNormalization {
            empty_root,
            empty_leaves,
            identical_join_parent,
        }
    }
}

impl ManipulationOperation for WeakNormalization {
    fn metadata(&self) -> OperationMetadata {
        pipeline_metadata()
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = OperationReport::default();

        let limit_child_count = LimitChildCount::new(2).expect("k=2 always valid");
        report.merge(limit_child_count.apply(graph, decomposition, labeling_functions, signal)?);
        if signal.is_terminated() {
            return Ok(report);
        }

        if self.empty_root {
            report.merge(AddEmptyRoot.apply(graph, decomposition, labeling_functions, signal)?);
            if signal.is_terminated() {
                return Ok(report);
            }
        }

        if self.empty_leaves {
            report.merge(AddEmptyLeaves.apply(graph, decomposition, labeling_functions, signal)?);
            if signal.is_terminated() {
                return Ok(report);
            }
        }

        let join_normalization = JoinNodeNormalization::new(self.identical_join_parent);
        report.merge(join_normalization.apply(graph, decomposition, labeling_functions, signal)?);
        Ok(report)
    }
}

/// `WeakNormalization` followed by `ExchangeNodeReplacement`. Post-condition:
/// every node is one of {empty-leaf, introduce, forget, binary-join,
/// (optional) empty-root}.
#[derive(Debug, Clone, Copy)]
pub struct SemiNormalization {
    weak: WeakNormalization,
}

impl SemiNormalization {
    pub fn new(empty_root: bool, empty_leaves: bool, identical_join_parent: bool) -> Self {
        SemiNormalization {
            weak: WeakNormalization::new(empty_root, empty_leaves, identical_join_parent),
        }
    }
}

impl ManipulationOperation for SemiNormalization {
    fn metadata(&self) -> OperationMetadata {
        pipeline_metadata()
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = self.weak.apply(graph, decomposition, labeling_functions, signal)?;
        if signal.is_terminated() {
            return Ok(report);
        }
        report.merge(ExchangeNodeReplacement.apply(graph, decomposition, labeling_functions, signal)?);
        Ok(report)
    }
}

/// `SemiNormalization` followed by `LimitMaximumIntroducedVertexCount(1)` and
/// `LimitMaximumForgottenVertexCount(1)`. Post-condition: every introduce
/// node introduces exactly one vertex; every forget node forgets exactly
/// one; every join node has two children with identical bag.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationOperation {
    semi: SemiNormalization,
}

impl NormalizationOperation {
    pub fn new(empty_root: bool, empty_leaves: bool, identical_join_parent: bool) -> Self {
        NormalizationOperation {
            semi: SemiNormalization::new(empty_root, empty_leaves, identical_join_parent),
        }
    }
}

impl ManipulationOperation for NormalizationOperation {
    fn metadata(&self) -> OperationMetadata {
        pipeline_metadata()
    }

    fn apply(
        &self,
        graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = self.semi.apply(graph, decomposition, labeling_functions, signal)?;
        if signal.is_terminated() {
            return Ok(report);
        }

        let limit_introduced = LimitMaximumIntroducedVertexCount::new(1, false).expect("k=1 always valid");
        report.merge(limit_introduced.apply(graph, decomposition, labeling_functions, signal)?);
        if signal.is_terminated() {
            return Ok(report);
        }

        let limit_forgotten = LimitMaximumForgottenVertexCount::new(1).expect("k=1 always valid");
        report.merge(limit_forgotten.apply(graph, decomposition, labeling_functions, signal)?);
        Ok(report)
    }
}

/// Bottom-up chain deduplication: while there exists a non-join node `v`
/// with a single child `c` such that `bag(v) == bag(c)`, removes `c`
/// (preferred over removing `v`, to preserve `v`'s own parent link).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionOperation;

impl ManipulationOperation for CompressionOperation {
    fn metadata(&self) -> OperationMetadata {
        OperationMetadata {
            is_local: false,
            creates_nodes: false,
            removes_nodes: true,
            modifies_bags: false,
            creates_subset_maximal_bags: false,
            creates_location_dependent_labels: false,
        }
    }

    fn apply(
        &self,
        _graph: &dyn Hypergraph,
        decomposition: &mut MutableTreeDecomposition,
        _labeling_functions: &[&dyn LabelingFunction],
        signal: &TerminationSignal,
    ) -> Result<OperationReport, DecompError> {
        let mut report = OperationReport::default();
        loop {
            if signal.is_terminated() {
                break;
            }
            let mut nodes: Vec<NodeId> = decomposition.node_ids().collect();
            nodes.sort_by_key(|n| n.0);

            let mut redundant_child = None;
            for v in nodes {
                let children = decomposition.children(v)?.to_vec();
                if children.len() != 1 {
                    continue;
                }
                let c = children[0];
                if decomposition.bag(v)? == decomposition.bag(c)? {
                    redundant_child = Some(c);
                    break;
                }
            }

            match redundant_child {
                None => break,
                Some(c) => {
                    decomposition.remove_node(c)?;
                    report.removed.push(c);
                }
            }
        }
        Ok(report)
    }
}
