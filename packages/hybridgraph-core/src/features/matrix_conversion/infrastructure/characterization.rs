// Characterization Attachment - indicator matrix keyed by extension names
//
// Characterization-method loaders deliver Q with columns named after
// extensions rather than identified by node ids. Each column name must
// resolve to exactly one extension node of the target graph.

use tracing::info;

use super::importer::{check_metadata_length, matrix_edges};
use super::scan::check_finite;
use crate::errors::{ConsistencyError, Result, StructuralError};
use crate::features::graph_store::Graph;
use crate::features::matrix_conversion::domain::CharacterizationRequest;
use crate::shared::models::{FlowKind, Node, NodeId, NodeKind};
use crate::shared::utils::id_generator::IdGenerator;

pub struct CharacterizationAttacher;

impl CharacterizationAttacher {
    pub fn new() -> Self {
        Self
    }

    /// New graph = input graph + indicator nodes + characterization edges
    pub fn attach(&self, graph: &Graph, request: &CharacterizationRequest) -> Result<Graph> {
        let (rows, cols) = request.indicator.dim();
        if cols != request.extension_names.len() {
            return Err(StructuralError::DimensionMismatch {
                left: "indicator",
                right: "extension",
                detail: format!(
                    "indicator matrix has {} columns, {} extension names given",
                    cols,
                    request.extension_names.len()
                ),
            }
            .into());
        }
        check_metadata_length("indicator", rows, &request.indicator_metadata)?;
        check_finite("indicator", &request.indicator)?;

        let extension_ids = request
            .extension_names
            .iter()
            .map(|name| resolve_extension(graph, name))
            .collect::<Result<Vec<NodeId>>>()?;

        let system = if request.system.is_empty() {
            graph.name()
        } else {
            request.system.as_str()
        };
        let indicator_ids = IdGenerator::assign(
            &request.identifiers,
            system,
            NodeKind::Indicator,
            "indicator",
            &request.indicator_metadata,
        )?;
        let nodes = indicator_ids
            .iter()
            .zip(&request.indicator_metadata)
            .enumerate()
            .map(|(index, (id, record))| -> Result<Node> {
                let mut node = Node::from_record(*id, NodeKind::Indicator, "indicator", index, record)?;
                node.system = system.to_string();
                Ok(node)
            })
            .collect::<Result<Vec<Node>>>()?;

        let mut out = graph.clone();
        for node in nodes {
            out.add_node(node)?;
        }
        let edges = matrix_edges(
            &request.indicator,
            &indicator_ids,
            &extension_ids,
            FlowKind::Characterization,
        );
        let edge_count = edges.len();
        for edge in edges {
            out.add_edge(edge)?;
        }

        info!(
            "Attached {} indicators to '{}' over {} extensions ({} characterization edges)",
            rows,
            graph.name(),
            cols,
            edge_count
        );
        Ok(out)
    }
}

impl Default for CharacterizationAttacher {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_extension(graph: &Graph, name: &str) -> Result<NodeId> {
    let mut matches = graph.nodes_of_kind(NodeKind::Extension).filter(|n| n.name == name);
    match (matches.next(), matches.count()) {
        (Some(node), 0) => Ok(node.id),
        (first, rest) => Err(ConsistencyError::UnmatchedExtension {
            name: name.to_string(),
            matches: usize::from(first.is_some()) + rest,
        }
        .into()),
    }
}
