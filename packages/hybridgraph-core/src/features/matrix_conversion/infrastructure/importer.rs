// System Importer - raw matrices -> Graph
//
// One node per matrix row/column, one edge per non-zero entry. Every shape,
// metadata and numeric check runs before the first node is created.

use ndarray::Array2;
use tracing::{debug, info};

use super::scan::{check_finite, nonzero_entries};
use crate::errors::{NumericError, Result, StructuralError, UsageError};
use crate::features::graph_store::Graph;
use crate::features::matrix_conversion::domain::{ImportRequest, MatrixConvention};
use crate::shared::models::{Edge, FlowKind, MetadataRecord, Node, NodeId, NodeKind};
use crate::shared::utils::id_generator::IdGenerator;

pub struct SystemImporter;

impl SystemImporter {
    pub fn new() -> Self {
        Self
    }

    /// Build a graph from one import request
    pub fn import(&self, request: &ImportRequest) -> Result<Graph> {
        let convention = request.options.require_convention()?;
        let production_kind = request.production_kind;
        let flow_kind = FlowKind::internal_to(production_kind)
            .ok_or(UsageError::NotAProductionKind(production_kind))?;

        // Phase 1: validate everything up front
        self.validate_shapes(request)?;
        check_finite("production", &request.production)?;
        if let Some(b) = &request.extension {
            check_finite("extension", b)?;
        }
        if let Some(q) = &request.indicator {
            check_finite("indicator", q)?;
        }
        let amounts = reference_production(&request.production, convention)?;

        // Phase 2: identifiers
        let strategy = &request.options.identifiers;
        let production_ids = IdGenerator::assign(
            strategy,
            &request.system,
            production_kind,
            "production",
            &request.production_metadata,
        )?;
        let extension_ids = IdGenerator::assign(
            strategy,
            &request.system,
            NodeKind::Extension,
            "extension",
            &request.extension_metadata,
        )?;
        let indicator_ids = IdGenerator::assign(
            strategy,
            &request.system,
            NodeKind::Indicator,
            "indicator",
            &request.indicator_metadata,
        )?;

        // Phase 3: nodes (built fully before insertion)
        let mut nodes = self.build_nodes(
            request,
            production_kind,
            "production",
            &production_ids,
            &request.production_metadata,
        )?;
        for (node, amount) in nodes.iter_mut().zip(&amounts) {
            node.production = *amount;
        }
        nodes.extend(self.build_nodes(
            request,
            NodeKind::Extension,
            "extension",
            &extension_ids,
            &request.extension_metadata,
        )?);
        nodes.extend(self.build_nodes(
            request,
            NodeKind::Indicator,
            "indicator",
            &indicator_ids,
            &request.indicator_metadata,
        )?);

        // Phase 4: edges (PARALLEL row scan, row-major assembly)
        let mut edges = production_edges(
            &request.production,
            &production_ids,
            flow_kind,
            convention,
        );
        if let Some(b) = &request.extension {
            let mut flows = matrix_edges(b, &extension_ids, &production_ids, FlowKind::ElementaryFlow);
            if convention == MatrixConvention::Technosphere {
                flows.iter_mut().for_each(|edge| edge.weight = edge.weight.abs());
            }
            edges.extend(flows);
        }
        if let Some(q) = &request.indicator {
            edges.extend(matrix_edges(q, &indicator_ids, &extension_ids, FlowKind::Characterization));
        }

        let mut graph = Graph::with_capacity(request.system.clone(), nodes.len(), edges.len());
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            entry_trace!(from = %edge.from, to = %edge.to, weight = edge.weight, kind = %edge.kind, "edge");
            graph.add_edge(edge)?;
        }

        info!(
            "Imported system '{}' ({} convention): {} production, {} extension, {} indicator nodes, {} edges",
            request.system,
            convention,
            production_ids.len(),
            extension_ids.len(),
            indicator_ids.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn validate_shapes(&self, request: &ImportRequest) -> Result<()> {
        if request.indicator.is_some() && request.extension.is_none() {
            return Err(UsageError::IndicatorWithoutExtension.into());
        }

        let (rows, cols) = request.production.dim();
        if rows != cols {
            return Err(StructuralError::DimensionMismatch {
                left: "production",
                right: "production",
                detail: format!("production matrix must be square, got {}x{}", rows, cols),
            }
            .into());
        }
        check_metadata_length("production", rows, &request.production_metadata)?;

        let extension_rows = match &request.extension {
            Some(b) => {
                if b.ncols() != rows {
                    return Err(StructuralError::DimensionMismatch {
                        left: "extension",
                        right: "production",
                        detail: format!(
                            "extension matrix has {} columns, production matrix has {} rows",
                            b.ncols(),
                            rows
                        ),
                    }
                    .into());
                }
                b.nrows()
            }
            None => 0,
        };
        check_metadata_length("extension", extension_rows, &request.extension_metadata)?;

        let indicator_rows = match &request.indicator {
            Some(q) => {
                if q.ncols() != extension_rows {
                    return Err(StructuralError::DimensionMismatch {
                        left: "indicator",
                        right: "extension",
                        detail: format!(
                            "indicator matrix has {} columns, extension matrix has {} rows",
                            q.ncols(),
                            extension_rows
                        ),
                    }
                    .into());
                }
                q.nrows()
            }
            None => 0,
        };
        check_metadata_length("indicator", indicator_rows, &request.indicator_metadata)?;

        debug!(
            "Validated shapes for '{}': production {}x{}, extension {} rows, indicator {} rows",
            request.system, rows, cols, extension_rows, indicator_rows
        );
        Ok(())
    }

    fn build_nodes(
        &self,
        request: &ImportRequest,
        kind: NodeKind,
        group: &'static str,
        ids: &[NodeId],
        records: &[MetadataRecord],
    ) -> Result<Vec<Node>> {
        ids.iter()
            .zip(records)
            .enumerate()
            .map(|(index, (id, record))| -> Result<Node> {
                let mut node = Node::from_record(*id, kind, group, index, record)?;
                node.system = request.system.clone();
                Ok(node)
            })
            .collect()
    }
}

impl Default for SystemImporter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_metadata_length(
    group: &'static str,
    expected: usize,
    records: &[MetadataRecord],
) -> Result<()> {
    if records.len() != expected {
        return Err(StructuralError::MetadataLength {
            group,
            expected,
            actual: records.len(),
        }
        .into());
    }
    Ok(())
}

/// Reference production per production node
///
/// `I-A`: 1.0 everywhere. `A`: absolute diagonal entry, which must be non-zero.
fn reference_production(production: &Array2<f64>, convention: MatrixConvention) -> Result<Vec<f64>> {
    match convention {
        MatrixConvention::TechnicalCoefficients => Ok(vec![1.0; production.nrows()]),
        MatrixConvention::Technosphere => production
            .diag()
            .iter()
            .enumerate()
            .map(|(index, v)| -> Result<f64> {
                if *v == 0.0 {
                    Err(NumericError::ZeroProduction { index }.into())
                } else {
                    Ok(v.abs())
                }
            })
            .collect(),
    }
}

/// Production matrix entries as edges
///
/// Under `A` the diagonal is the reference production (not an edge) and
/// inputs are stored as absolute values. Extension entries are made absolute
/// as well by the caller.
fn production_edges(
    production: &Array2<f64>,
    ids: &[NodeId],
    kind: FlowKind,
    convention: MatrixConvention,
) -> Vec<Edge> {
    nonzero_entries(production)
        .into_iter()
        .filter_map(|(r, c, v)| match convention {
            MatrixConvention::TechnicalCoefficients => Some(Edge::new(ids[r], ids[c], v, kind)),
            MatrixConvention::Technosphere if r == c => None,
            MatrixConvention::Technosphere => Some(Edge::new(ids[r], ids[c], v.abs(), kind)),
        })
        .collect()
}

pub(crate) fn matrix_edges(
    matrix: &Array2<f64>,
    row_ids: &[NodeId],
    col_ids: &[NodeId],
    kind: FlowKind,
) -> Vec<Edge> {
    nonzero_entries(matrix)
        .into_iter()
        .map(|(r, c, v)| Edge::new(row_ids[r], col_ids[c], v, kind))
        .collect()
}
