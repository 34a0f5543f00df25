//! Primitive and composite manipulation operations.

pub mod compose;
pub mod exchange;
pub mod framework;
pub mod join;
pub mod labeling_function;
pub mod structural;
pub mod width;

pub use compose::{CompressionOperation, NormalizationOperation, SemiNormalization, WeakNormalization};
pub use exchange::ExchangeNodeReplacement;
pub use framework::{ManipulationOperation, OperationMetadata, OperationReport};
pub use join::{AddIdenticalJoinNodeParent, JoinNodeNormalization};
pub use labeling_function::LabelingFunction;
pub use structural::{AddEmptyLeaves, AddEmptyRoot, LimitChildCount};
pub use width::{LimitMaximumForgottenVertexCount, LimitMaximumIntroducedVertexCount};
