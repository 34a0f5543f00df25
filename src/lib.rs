pub mod bag;
pub mod cancellation;
pub mod decomposition;
pub mod error;
pub mod fitness;
pub mod hypergraph;
pub mod id;
pub mod labeling;
pub mod operations;
pub mod optimization;
pub mod vertex_selection;

pub use bag::{Bag, InducedEdges};
pub use cancellation::TerminationSignal;
pub use decomposition::MutableTreeDecomposition;
pub use error::DecompError;
pub use fitness::FitnessFunction;
pub use hypergraph::{Hyperedge, Hypergraph, SimpleHypergraph};
pub use id::{EdgeId, NodeId, VertexId};
pub use labeling::{GraphLabeling, LabelValue, LabelingCollection, NodeLabelMap};
pub use operations::{
    AddEmptyLeaves, AddEmptyRoot, AddIdenticalJoinNodeParent, CompressionOperation,
    ExchangeNodeReplacement, JoinNodeNormalization, LabelingFunction, LimitChildCount,
    LimitMaximumForgottenVertexCount, LimitMaximumIntroducedVertexCount, ManipulationOperation,
    NormalizationOperation, OperationMetadata, OperationReport, SemiNormalization,
    WeakNormalization,
};
pub use optimization::TreeDecompositionOptimization;
pub use vertex_selection::{AllNodesAscending, VertexSelectionStrategy};
