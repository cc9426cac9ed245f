//! Matrix Conversion UseCase
//!
//! Entry points for moving between raw matrices and graphs. Each call is
//! timed and logged as one step.

use crate::errors::Result;
use crate::features::graph_store::Graph;
use crate::features::matrix_conversion::domain::{
    CharacterizationRequest, ExportOptions, ImportRequest, MatrixRole, SystemMatrices,
};
use crate::features::matrix_conversion::infrastructure::{
    CharacterizationAttacher, MatrixExporter, SystemImporter,
};
use crate::shared::models::{LabeledMatrix, MatrixFormat};
use crate::shared::utils::timing::LogTimer;

/// Build a graph from raw matrices and metadata
pub fn import_system(request: &ImportRequest) -> Result<Graph> {
    let _timer = LogTimer::start(format!("importing system '{}'", request.system));
    SystemImporter::new().import(request)
}

/// Attach a name-keyed indicator matrix to a graph; the input is left untouched
pub fn attach_characterization(graph: &Graph, request: &CharacterizationRequest) -> Result<Graph> {
    let _timer = LogTimer::start(format!("attaching characterization to '{}'", graph.name()));
    CharacterizationAttacher::new().attach(graph, request)
}

/// Export one matrix role, normalized, ordered by `sort_keys` on both axes
pub fn graph_to_matrices(
    graph: &Graph,
    role: MatrixRole,
    format: MatrixFormat,
    sort_keys: &[&str],
) -> Result<LabeledMatrix> {
    let options = ExportOptions::default().format(format).sort_by(role, sort_keys);
    export_matrix(graph, role, &options)
}

/// Export one matrix role with explicit options
pub fn export_matrix(graph: &Graph, role: MatrixRole, options: &ExportOptions) -> Result<LabeledMatrix> {
    let _timer = LogTimer::start(format!("generating {} matrix of '{}'", role, graph.name()));
    MatrixExporter::new(graph).export(role, options)
}

/// Export A, B and Q with aligned axes
pub fn system_matrices(graph: &Graph, options: &ExportOptions) -> Result<SystemMatrices> {
    let _timer = LogTimer::start(format!("generating system matrices of '{}'", graph.name()));
    MatrixExporter::new(graph).export_system(options)
}
