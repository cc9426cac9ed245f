//! LCA UseCase
//!
//! Graph -> matrices -> production -> inventory -> impact, in one call.

use tracing::info;

use crate::errors::{Result, UsageError};
use crate::features::graph_store::Graph;
use crate::features::leontief::domain::{Demand, LcaResult};
use crate::features::leontief::infrastructure::{impact_vector, inventory_vector, production_vector};
use crate::features::matrix_conversion::{system_matrices, ExportOptions};
use crate::shared::models::{LabeledVector, NodeId};
use crate::shared::utils::timing::LogTimer;

/// Impact vector for `amount` units of final demand of one production node
pub fn lca(graph: &Graph, demand_node: NodeId, amount: f64) -> Result<LabeledVector> {
    let result = lca_with_options(graph, &Demand::single(demand_node, amount), &ExportOptions::default())?;
    Ok(result.impact)
}

/// Full calculation with explicit export options
pub fn lca_with_options(graph: &Graph, demand: &Demand, options: &ExportOptions) -> Result<LcaResult> {
    let _timer = LogTimer::start(format!("calculating LCA of '{}'", graph.name()));

    let matrices = system_matrices(graph, options)?;
    let b = matrices.b.ok_or(UsageError::MissingRole("extension"))?;
    let q = matrices.q.ok_or(UsageError::MissingRole("indicator"))?;

    let production = {
        let _timer = LogTimer::start("calculating production vector");
        production_vector(&matrices.a, demand)?
    };
    let inventory = inventory_vector(&production, &b)?;
    let impact = impact_vector(&inventory, &q)?;

    info!(
        "LCA of '{}': {} production nodes, {} extensions, {} indicators",
        graph.name(),
        production.len(),
        inventory.len(),
        impact.len()
    );
    Ok(LcaResult {
        production,
        inventory,
        impact,
    })
}
