//! Hybridization UseCase

use crate::errors::Result;
use crate::features::graph_store::Graph;
use crate::features::hybridization::domain::{Concordance, HybridGraph, HybridizationConfig};
use crate::features::hybridization::infrastructure::Hybridizer;
use crate::shared::utils::timing::LogTimer;

/// Merge a sectoral and a process graph; returns the hybrid graph
pub fn hybridize(
    sectoral: &Graph,
    process: &Graph,
    concordance: &Concordance,
    config: &HybridizationConfig,
) -> Result<Graph> {
    hybridize_with_report(sectoral, process, concordance, config).map(|hybrid| hybrid.graph)
}

/// Merge a sectoral and a process graph, keeping the id map and report
pub fn hybridize_with_report(
    sectoral: &Graph,
    process: &Graph,
    concordance: &Concordance,
    config: &HybridizationConfig,
) -> Result<HybridGraph> {
    let _timer = LogTimer::start(format!(
        "hybridizing '{}' with '{}'",
        sectoral.name(),
        process.name()
    ));
    Hybridizer::new(sectoral, process, concordance, config).run()
}
