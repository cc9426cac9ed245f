/*
 * hybridgraph - Graph/Matrix Engine for Hybrid Life-Cycle Assessment
 *
 * Feature-First Architecture:
 * - shared/      : Node/Edge/matrix models, identifier generation, log timer
 * - config/      : Calculation configuration (YAML schema v1)
 * - features/    : graph_store -> matrix_conversion -> hybridization -> leontief
 *
 * Data flow:
 *   raw matrices -> import -> Graph -> [hybridize] -> export -> Leontief -> impact
 */

#![allow(clippy::should_implement_trait)] // from_str returns domain errors
#![allow(clippy::derivable_impls)] // Manual Default impls document the defaults
#![allow(clippy::new_without_default)] // Stateless converters

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
#[macro_use]
pub mod shared;

/// Error types
pub mod errors;

/// Calculation configuration
pub mod config;

/// Feature modules
pub mod features;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use errors::{
    ConsistencyError, ErrorKind, HybridGraphError, NumericError, Result, StructuralError, UsageError,
};

pub use shared::models::{
    Edge, FlowKind, LabeledMatrix, LabeledVector, MatrixData, MatrixFormat, MetadataRecord, Node,
    NodeId, NodeKind,
};
pub use shared::{IdGenerator, IdentifierStrategy, LogTimer};

pub use config::{CalculationConfig, ConfigError, Validatable};

pub use features::graph_store::{Graph, GraphStats};

pub use features::matrix_conversion::{
    attach_characterization, export_matrix, graph_to_matrices, import_system, metadata_records,
    system_matrices, CharacterizationRequest, ExportOptions, ImportOptions, ImportRequest,
    MatrixConvention, MatrixRole, SortKeys, SystemMatrices,
};

pub use features::hybridization::{
    hybridize, hybridize_with_report, Concordance, CutoffPolicy, HybridGraph, HybridizationConfig,
    HybridizationReport,
};

pub use features::leontief::{
    impact_matrix, impact_vector, inventory_matrix, inventory_vector, lca, lca_with_options,
    production_vector, CategoryMatrix, Demand, InventorySplit, LcaResult, LeontiefInverse,
};
