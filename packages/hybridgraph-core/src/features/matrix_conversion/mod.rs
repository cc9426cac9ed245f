// Matrix Conversion
//
// Raw coefficient matrices <-> Graph.
//
// ## Architecture
// - Domain: requests, options, MatrixConvention, MatrixRole, SystemMatrices
// - Infrastructure: SystemImporter, MatrixExporter, CharacterizationAttacher
//   (row-parallel scans via rayon)
// - Application: timed entry points
//
// ## Conventions
// - Entry M[i, j] <-> edge from row node i to column node j
// - `I-A`: technical coefficients, production = 1.0, diagonal kept
// - `A`: technosphere, production = |diagonal|, absolute off-diagonal inputs
// - Export divides A and B column-wise by the column node's production

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    attach_characterization, export_matrix, graph_to_matrices, import_system, system_matrices,
};
pub use domain::{
    CharacterizationRequest, ExportOptions, ImportOptions, ImportRequest, MatrixConvention,
    MatrixRole, SortKeys, SystemMatrices,
};
pub use infrastructure::{metadata_records, order_nodes};
