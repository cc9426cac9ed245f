//! Error types for hybridgraph-core
//!
//! Every failure belongs to one of four families:
//!
//! - **Structural**: dimension mismatches, duplicate identifiers, malformed metadata
//! - **Consistency**: concordance coverage/weights, conflicting duplicate edges
//! - **Numeric**: non-finite inputs, singular Leontief systems
//! - **Usage**: unknown conventions/policies, bad demand, invalid configuration
//!
//! Errors are reported by the call that detects them and are fatal to the
//! current calculation. Nothing is downgraded to a warning or a default value.

use std::fmt;
use thiserror::Error;

use crate::shared::models::{FlowKind, NodeId, NodeKind};

/// Error family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Structural,
    Consistency,
    Numeric,
    Usage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Consistency => "consistency",
            ErrorKind::Numeric => "numeric",
            ErrorKind::Usage => "usage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for hybridgraph-core operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HybridGraphError {
    #[error("[structural] {0}")]
    Structural(#[from] StructuralError),

    #[error("[consistency] {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("[numeric] {0}")]
    Numeric(#[from] NumericError),

    #[error("[usage] {0}")]
    Usage(#[from] UsageError),
}

impl HybridGraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HybridGraphError::Structural(_) => ErrorKind::Structural,
            HybridGraphError::Consistency(_) => ErrorKind::Consistency,
            HybridGraphError::Numeric(_) => ErrorKind::Numeric,
            HybridGraphError::Usage(_) => ErrorKind::Usage,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    pub fn is_consistency(&self) -> bool {
        self.kind() == ErrorKind::Consistency
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ErrorKind::Numeric
    }

    pub fn is_usage(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }
}

/// Shape and identity errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    /// Two matrices (or a matrix and a vector) do not fit together
    #[error("dimension mismatch between {left} and {right}: {detail}")]
    DimensionMismatch {
        left: &'static str,
        right: &'static str,
        detail: String,
    },

    /// Node identifier already present in the graph
    #[error("duplicate node identifier {0}")]
    DuplicateNode(NodeId),

    /// Edge endpoint or lookup refers to a node the graph does not hold
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Metadata list length differs from the matrix dimension it describes
    #[error("metadata for {group} has {actual} records, matrix dimension is {expected}")]
    MetadataLength {
        group: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Required field absent from a metadata record
    #[error("metadata record {index} of {group} is missing required field '{field}'")]
    MissingField {
        group: &'static str,
        index: usize,
        field: String,
    },

    /// Metadata values must be scalars (string, number, bool or null)
    #[error("metadata field '{key}' of {group} record {index} is not a scalar value")]
    NonScalarMetadata {
        group: &'static str,
        index: usize,
        key: String,
    },

    /// Two records derive the same identifier from the designated field
    #[error("records {first} and {second} of {group} derive the same identifier from '{field}'")]
    DerivedIdCollision {
        group: &'static str,
        field: String,
        first: usize,
        second: usize,
    },

    /// Row/column identifiers of two operands are not aligned
    #[error("labels of {left} and {right} do not align")]
    LabelMismatch {
        left: &'static str,
        right: &'static str,
    },
}

/// Graph and concordance consistency errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyError {
    /// Same-kind edge already connects this ordered pair
    #[error("duplicate {kind} edge {from} -> {to}")]
    DuplicateEdge {
        from: NodeId,
        to: NodeId,
        kind: FlowKind,
    },

    /// Process designated for hybridization has no non-zero concordance row
    #[error("process {0} has no sector in the concordance mapping")]
    UnmappedProcess(NodeId),

    /// Concordance column does not sum to the expected total
    #[error("concordance weights of process {process} sum to {sum}, expected {expected}")]
    ConcordanceWeights {
        process: NodeId,
        sum: f64,
        expected: f64,
    },

    /// Process mapped to several sectors without explicit fractional weighting
    #[error("process {process} maps to {sectors} sectors; enable fractional mapping to allow this")]
    FractionalMapping { process: NodeId, sectors: usize },

    /// Concordance entries must be non-negative
    #[error("negative concordance weight {value} for sector {sector} / process {process}")]
    NegativeConcordance {
        sector: NodeId,
        process: NodeId,
        value: f64,
    },

    /// Concordance refers to a node missing from (or of the wrong kind in) its graph
    #[error("concordance refers to {id}, which is not a {expected} node of its graph")]
    UnknownConcordanceNode { id: NodeId, expected: NodeKind },

    /// Characterization column name does not resolve to exactly one extension node
    #[error("extension '{name}' matches {matches} nodes in the graph, expected exactly one")]
    UnmatchedExtension { name: String, matches: usize },
}

/// Numerical failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    /// NaN or infinite matrix entry
    #[error("non-finite entry {value} in {role} matrix at ({row}, {col})")]
    NonFinite {
        role: &'static str,
        row: usize,
        col: usize,
        value: f64,
    },

    /// NaN or infinite edge weight
    #[error("non-finite weight {value} on edge {from} -> {to}")]
    NonFiniteWeight { from: NodeId, to: NodeId, value: f64 },

    /// (I - A) cannot be inverted
    #[error("(I - A) is singular ({dimension}x{dimension}); the system cannot be produced")]
    SingularMatrix { dimension: usize },

    /// Reference production of a node is zero
    #[error("reference production of production node {index} is zero")]
    ZeroProduction { index: usize },
}

/// Caller mistakes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsageError {
    #[error("unknown matrix convention '{0}'. Valid conventions: I-A, A")]
    UnknownConvention(String),

    /// Import request declared no matrix convention
    #[error("no matrix convention declared. Choose one of: I-A, A")]
    MissingConvention,

    /// Hybridization requested without naming a cutoff policy
    #[error("no cutoff policy named. Choose one of: full_replacement, residual_blending")]
    MissingCutoffPolicy,

    #[error("unknown cutoff policy '{0}'. Valid policies: full_replacement, residual_blending")]
    UnknownCutoffPolicy(String),

    #[error("unknown matrix format '{0}'. Valid formats: dense, sparse")]
    UnknownMatrixFormat(String),

    #[error("unknown node kind '{0}'. Valid kinds: sector, process, extension, indicator")]
    UnknownNodeKind(String),

    /// Production nodes must be sectors or processes
    #[error("{0} is not a production node kind")]
    NotAProductionKind(NodeKind),

    /// An indicator matrix needs an extension matrix to attach to
    #[error("indicator matrix supplied without an extension matrix")]
    IndicatorWithoutExtension,

    /// Demand refers to a node outside the production matrix
    #[error("demand node {0} is not present in the production matrix")]
    UnknownDemandNode(NodeId),

    /// Inventory split refers to a node outside the production vector
    #[error("split category '{category}' refers to {id}, which is not in the production vector")]
    UnknownSplitNode { category: String, id: NodeId },

    /// Graph lacks the nodes needed for the requested matrix
    #[error("graph has no {0} nodes")]
    MissingRole(&'static str),

    /// Built-in node fields cannot be changed through the metadata map
    #[error("'{0}' is a reserved node field and cannot be set as metadata")]
    ReservedMetadataKey(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for hybridgraph operations
pub type Result<T> = std::result::Result<T, HybridGraphError>;
