//! Shared models

mod edge;
mod matrix;
mod node;

pub use edge::{Edge, FlowKind};
pub use matrix::{LabeledMatrix, LabeledVector, MatrixData, MatrixFormat};
pub use node::{compare_attribute, Node, NodeBuilder, NodeId, NodeKind, RESERVED_KEYS};

pub(crate) use node::is_scalar;

// Re-export serde_json types used by node metadata records
pub use serde_json::{Map, Value};

/// One importer metadata record (one matrix row/column)
pub type MetadataRecord = Map<String, Value>;
