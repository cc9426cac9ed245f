// Matrix Exporter - Graph -> ordered labeled matrices
//
// Node order is graph insertion order unless sort keys are given; with sort
// keys it is the attribute tuple under the total value order, ties broken by
// identifier. Parallel edges of different kinds sum into one cell.

use ahash::AHashMap;
use rayon::prelude::*;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use crate::errors::{NumericError, Result, StructuralError, UsageError};
use crate::features::graph_store::Graph;
use crate::features::matrix_conversion::domain::{ExportOptions, MatrixRole, SystemMatrices};
use crate::shared::models::{compare_attribute, FlowKind, LabeledMatrix, MetadataRecord, Node, NodeId, NodeKind};

pub struct MatrixExporter<'g> {
    graph: &'g Graph,
}

impl<'g> MatrixExporter<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Export one role; the same sort keys order both axes
    pub fn export(&self, role: MatrixRole, options: &ExportOptions) -> Result<LabeledMatrix> {
        let keys = options.sort_keys.for_role(role);
        let production = || self.ordered(self.graph.production_nodes(), keys);
        let (rows, cols) = match role {
            MatrixRole::Production => {
                let ids = production();
                (ids.clone(), ids)
            }
            MatrixRole::Extension => (self.ordered_kind(NodeKind::Extension, keys), production()),
            MatrixRole::Indicator => (
                self.ordered_kind(NodeKind::Indicator, keys),
                self.ordered_kind(NodeKind::Extension, keys),
            ),
        };
        self.require(role, &rows)?;
        self.assemble(role, rows, cols, options)
    }

    /// Export A, B and Q with aligned axes, each role under its own sort keys
    pub fn export_system(&self, options: &ExportOptions) -> Result<SystemMatrices> {
        let keys = &options.sort_keys;
        let production = self.ordered(self.graph.production_nodes(), &keys.production);
        let extension = self.ordered_kind(NodeKind::Extension, &keys.extension);
        let indicator = self.ordered_kind(NodeKind::Indicator, &keys.indicator);
        self.require(MatrixRole::Production, &production)?;

        let a = self.assemble(MatrixRole::Production, production.clone(), production.clone(), options)?;
        let b = if extension.is_empty() {
            None
        } else {
            Some(self.assemble(MatrixRole::Extension, extension.clone(), production, options)?)
        };
        let q = if indicator.is_empty() || extension.is_empty() {
            None
        } else {
            Some(self.assemble(MatrixRole::Indicator, indicator, extension, options)?)
        };

        Ok(SystemMatrices { a, b, q })
    }

    fn require(&self, role: MatrixRole, rows: &[NodeId]) -> Result<()> {
        if rows.is_empty() {
            return Err(UsageError::MissingRole(role.as_str()).into());
        }
        Ok(())
    }

    fn ordered_kind(&self, kind: NodeKind, keys: &[String]) -> Vec<NodeId> {
        self.ordered(self.graph.nodes_of_kind(kind), keys)
    }

    fn ordered<'a>(&self, nodes: impl Iterator<Item = &'a Node>, keys: &[String]) -> Vec<NodeId> {
        order_nodes(nodes, keys)
    }

    fn assemble(
        &self,
        role: MatrixRole,
        row_ids: Vec<NodeId>,
        col_ids: Vec<NodeId>,
        options: &ExportOptions,
    ) -> Result<LabeledMatrix> {
        let row_pos = positions(&row_ids);
        let col_pos = positions(&col_ids);

        let mut triplets = Vec::new();
        for edge in self.graph.edges().filter(|e| role_accepts(role, e.kind)) {
            if let (Some(&r), Some(&c)) = (row_pos.get(&edge.from), col_pos.get(&edge.to)) {
                entry_trace!(role = role.as_str(), row = r, col = c, weight = edge.weight, "cell");
                triplets.push((r, c, edge.weight));
            }
        }

        // Columns of A and B are production nodes
        if options.normalize && role != MatrixRole::Indicator {
            let production = col_ids
                .iter()
                .enumerate()
                .map(|(index, id)| -> Result<f64> {
                    let node = self
                        .graph
                        .node(id)
                        .ok_or(StructuralError::UnknownNode(*id))?;
                    if node.production == 0.0 {
                        return Err(NumericError::ZeroProduction { index }.into());
                    }
                    Ok(node.production)
                })
                .collect::<Result<Vec<f64>>>()?;
            for (_, c, v) in triplets.iter_mut() {
                *v /= production[*c];
            }
        }

        debug!(
            "Assembled {} matrix {}x{} ({} entries, {})",
            role,
            row_ids.len(),
            col_ids.len(),
            triplets.len(),
            options.format
        );
        LabeledMatrix::from_triplets(row_ids, col_ids, &triplets, options.format)
    }
}

fn role_accepts(role: MatrixRole, kind: FlowKind) -> bool {
    match role {
        MatrixRole::Production => kind.is_production_flow(),
        MatrixRole::Extension => kind == FlowKind::ElementaryFlow,
        MatrixRole::Indicator => kind == FlowKind::Characterization,
    }
}

fn positions(ids: &[NodeId]) -> AHashMap<NodeId, usize> {
    ids.iter().enumerate().map(|(i, id)| (*id, i)).collect()
}

/// Deterministic node order
///
/// No keys: iteration order. Keys: attribute tuple, then identifier.
pub fn order_nodes<'a>(nodes: impl Iterator<Item = &'a Node>, keys: &[String]) -> Vec<NodeId> {
    if keys.is_empty() {
        return nodes.map(|n| n.id).collect();
    }

    let mut keyed: Vec<(Vec<Option<Value>>, NodeId)> = nodes
        .map(|n| (keys.iter().map(|k| n.attribute(k)).collect(), n.id))
        .collect();

    // Stable parallel sort (PARALLEL)
    keyed.par_sort_by(|(a, a_id), (b, b_id)| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| compare_attribute(x, y))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_id.cmp(b_id))
    });

    keyed.into_iter().map(|(_, id)| id).collect()
}

/// Metadata records for an ordered id list, ready to feed back into an import
pub fn metadata_records(graph: &Graph, ids: &[NodeId]) -> Result<Vec<MetadataRecord>> {
    ids.iter()
        .map(|id| -> Result<MetadataRecord> {
            let node = graph.node(id).ok_or(StructuralError::UnknownNode(*id))?;
            Ok(node.to_record())
        })
        .collect()
}
