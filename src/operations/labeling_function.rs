//! The labeling-function contract: pluggable objects computing a new label
//! for a freshly created decomposition node from its bag and its own
//! current label map.

use crate::hypergraph::Hypergraph;
use crate::bag::Bag;
use crate::labeling::{LabelValue, NodeLabelMap};

/// Must be deterministic and side-effect free for identical inputs.
pub trait LabelingFunction {
    /// The label name this function's results are stored under.
    fn name(&self) -> &str;

    fn compute(&self, graph: &dyn Hypergraph, bag: &Bag, node_labels: &NodeLabelMap) -> Box<dyn LabelValue>;
}
