// Concordance Hybridizer
//
// Merges a sectoral graph and a process graph into a new hybrid graph.
//
// For a designated process p and concordance H (sector x process):
//   u(s', p)       = sum_s H[s, p] * a_S[s', s]     upstream requirement
//   covered(s', p) = sum_q H[s', q] * a_P[q, p]     part already in process data
//   d(p, s'')      = sum_s H[s, p] * a_S[s, s'']    downstream supply
//   coverage(s)    = min(1, sum_p H[s, p])          over designated processes
//
// Inputs are never mutated. Per-process link computation is independent
// and runs in parallel; results are assembled in designated-process order.

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Validatable;
use crate::errors::{ConsistencyError, NumericError, Result, StructuralError};
use crate::features::graph_store::Graph;
use crate::features::hybridization::domain::{
    Concordance, CutoffPolicy, HybridGraph, HybridizationConfig, HybridizationReport,
};
use crate::shared::models::{Edge, FlowKind, NodeId, NodeKind};
use crate::shared::utils::id_generator::IdGenerator;

// ============================================================
// Working structures
// ============================================================

/// Validated concordance
struct Mapping {
    /// Designated processes with their (sector, share) pairs, designated order
    designated: Vec<(NodeId, Vec<(NodeId, f64)>)>,
    /// Every concordance column: process -> (sector, share)
    by_process: AHashMap<NodeId, Vec<(NodeId, f64)>>,
    /// Sector -> min(1, share mapped to designated processes)
    coverage: AHashMap<NodeId, f64>,
}

impl Mapping {
    #[inline]
    fn coverage(&self, sector: &NodeId) -> f64 {
        self.coverage.get(sector).copied().unwrap_or(0.0)
    }
}

/// Sums keyed by node id, iterated in first-insertion order
#[derive(Default)]
struct Accumulator {
    order: Vec<NodeId>,
    values: AHashMap<NodeId, f64>,
}

impl Accumulator {
    fn add(&mut self, id: NodeId, value: f64) {
        match self.values.get_mut(&id) {
            Some(sum) => *sum += value,
            None => {
                self.order.push(id);
                self.values.insert(id, value);
            }
        }
    }

    #[inline]
    fn get(&self, id: &NodeId) -> f64 {
        self.values.get(id).copied().unwrap_or(0.0)
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.order.iter().map(move |id| (*id, self.get(id)))
    }
}

/// New links of one designated process
#[derive(Default)]
struct ProcessLinks {
    upstream: Vec<Edge>,
    downstream: Vec<Edge>,
    suppressed: usize,
}

// ============================================================
// Hybridizer
// ============================================================

pub struct Hybridizer<'a> {
    sectoral: &'a Graph,
    process: &'a Graph,
    concordance: &'a Concordance,
    config: &'a HybridizationConfig,
}

impl<'a> Hybridizer<'a> {
    pub fn new(
        sectoral: &'a Graph,
        process: &'a Graph,
        concordance: &'a Concordance,
        config: &'a HybridizationConfig,
    ) -> Self {
        Self {
            sectoral,
            process,
            concordance,
            config,
        }
    }

    pub fn run(&self) -> Result<HybridGraph> {
        // Phase 1: validation (nothing is built on failure)
        self.config.validate()?;
        let mapping = self.validate_concordance()?;
        self.check_disjoint()?;
        debug!(
            "Concordance validated: {} sectors, {} processes, {} designated",
            self.concordance.sectors().len(),
            self.concordance.processes().len(),
            mapping.designated.len()
        );

        // Phase 2: upstream/downstream links per designated process (PARALLEL)
        let links: Vec<ProcessLinks> = mapping
            .designated
            .par_iter()
            .map(|(process, shares)| self.link_process(*process, shares, &mapping))
            .collect();

        // Phase 3: compose
        let hybrid = self.compose(&mapping, links)?;
        let report = hybrid.report;
        info!(
            "Hybridized '{}' with '{}' ({}): {} upstream created, {} suppressed, {} downstream, {} proxy scaled, {} proxy removed",
            self.sectoral.name(),
            self.process.name(),
            self.config.cutoff_policy,
            report.upstream_created,
            report.upstream_suppressed,
            report.downstream_created,
            report.proxy_scaled,
            report.proxy_removed
        );
        Ok(hybrid)
    }

    fn validate_concordance(&self) -> Result<Mapping> {
        for id in self.concordance.sectors() {
            require_kind(self.sectoral, id, NodeKind::Sector)?;
        }
        for id in self.concordance.processes() {
            require_kind(self.process, id, NodeKind::Process)?;
        }

        let matrix = self.concordance.matrix();
        let mut by_process: AHashMap<NodeId, Vec<(NodeId, f64)>> = AHashMap::new();
        for (row, col, value) in matrix.nonzero_entries() {
            let sector = matrix.row_ids[row];
            let process = matrix.col_ids[col];
            if !value.is_finite() {
                return Err(NumericError::NonFinite {
                    role: "concordance",
                    row,
                    col,
                    value,
                }
                .into());
            }
            if value < 0.0 {
                return Err(ConsistencyError::NegativeConcordance {
                    sector,
                    process,
                    value,
                }
                .into());
            }
            by_process.entry(process).or_default().push((sector, value));
        }

        let requested = match &self.config.processes {
            Some(processes) => processes.clone(),
            None => self.concordance.processes().to_vec(),
        };
        let mut seen = AHashSet::with_capacity(requested.len());
        let mut designated = Vec::with_capacity(requested.len());
        for process in requested {
            if !seen.insert(process) {
                continue;
            }
            require_kind(self.process, &process, NodeKind::Process)?;
            let shares = by_process.get(&process).cloned().unwrap_or_default();
            if shares.is_empty() {
                return Err(ConsistencyError::UnmappedProcess(process).into());
            }
            if shares.len() > 1 && !self.config.allow_fractional_mapping {
                return Err(ConsistencyError::FractionalMapping {
                    process,
                    sectors: shares.len(),
                }
                .into());
            }
            let sum: f64 = shares.iter().map(|(_, h)| h).sum();
            if (sum - 1.0).abs() > self.config.weight_tolerance {
                return Err(ConsistencyError::ConcordanceWeights {
                    process,
                    sum,
                    expected: 1.0,
                }
                .into());
            }
            designated.push((process, shares));
        }

        let mut coverage: AHashMap<NodeId, f64> = AHashMap::new();
        for (_, shares) in &designated {
            for (sector, share) in shares {
                *coverage.entry(*sector).or_insert(0.0) += share;
            }
        }
        for value in coverage.values_mut() {
            *value = value.min(1.0);
        }

        Ok(Mapping {
            designated,
            by_process,
            coverage,
        })
    }

    fn check_disjoint(&self) -> Result<()> {
        match self.process.nodes().find(|n| self.sectoral.contains(&n.id)) {
            Some(node) => Err(StructuralError::DuplicateNode(node.id).into()),
            None => Ok(()),
        }
    }

    fn link_process(&self, process: NodeId, shares: &[(NodeId, f64)], mapping: &Mapping) -> ProcessLinks {
        let mut links = ProcessLinks::default();

        // u(s', p)
        let mut upstream = Accumulator::default();
        for (sector, share) in shares {
            for edge in self.sectoral.edges_into(sector) {
                if edge.kind == FlowKind::SectorFlow {
                    upstream.add(edge.from, share * coefficient(self.sectoral, edge));
                }
            }
        }

        // covered(s', p)
        let mut covered = Accumulator::default();
        for edge in self.process.edges_into(&process) {
            if edge.kind != FlowKind::ProcessFlow {
                continue;
            }
            if let Some(supplier_shares) = mapping.by_process.get(&edge.from) {
                let a_qp = coefficient(self.process, edge);
                for (sector, share) in supplier_shares {
                    covered.add(*sector, share * a_qp);
                }
            }
        }

        let scale = production_of(self.process, &process);
        for (supplier, requirement) in upstream.iter() {
            if requirement == 0.0 {
                continue;
            }
            let already = covered.get(&supplier);
            let weight = match self.config.cutoff_policy {
                CutoffPolicy::FullReplacement if already > 0.0 => 0.0,
                CutoffPolicy::FullReplacement => requirement,
                CutoffPolicy::ResidualBlending => (requirement - already).max(0.0),
            };
            if weight > 0.0 {
                entry_trace!(from = %supplier, to = %process, weight, "upstream");
                links
                    .upstream
                    .push(Edge::new(supplier, process, weight * scale, FlowKind::UpstreamFlow));
            } else {
                links.suppressed += 1;
            }
        }

        if self.config.downstream {
            let mut downstream = Accumulator::default();
            for (sector, share) in shares {
                for edge in self.sectoral.edges_from(sector) {
                    if edge.kind == FlowKind::SectorFlow {
                        downstream.add(edge.to, share * coefficient(self.sectoral, edge));
                    }
                }
            }
            for (customer, weight) in downstream.iter() {
                if weight != 0.0 {
                    let weight = weight * production_of(self.sectoral, &customer);
                    entry_trace!(from = %process, to = %customer, weight, "downstream");
                    links
                        .downstream
                        .push(Edge::new(process, customer, weight, FlowKind::DownstreamFlow));
                }
            }
        }

        links
    }

    /// Scale applied to a sectoral proxy edge
    fn proxy_factor(&self, edge: &Edge, mapping: &Mapping) -> f64 {
        if self.config.cutoff_policy != CutoffPolicy::FullReplacement {
            return 1.0;
        }
        let mut factor = 1.0 - mapping.coverage(&edge.to);
        if self.config.downstream {
            factor *= 1.0 - mapping.coverage(&edge.from);
        }
        factor
    }

    fn compose(&self, mapping: &Mapping, links: Vec<ProcessLinks>) -> Result<HybridGraph> {
        let node_count = self.sectoral.len() + self.process.len();
        let edge_count = self.sectoral.edge_count() + self.process.edge_count();
        let mut graph = Graph::with_capacity(
            format!("{}+{}", self.sectoral.name(), self.process.name()),
            node_count,
            edge_count,
        );
        let mut report = HybridizationReport::default();

        let mut id_map: AHashMap<NodeId, NodeId> = AHashMap::new();
        for node in self.sectoral.nodes().chain(self.process.nodes()) {
            let mut node = node.clone();
            if self.config.remint_identifiers {
                let fresh = IdGenerator::mint();
                id_map.insert(node.id, fresh);
                node.id = fresh;
            }
            graph.add_node(node)?;
        }
        let translate = |id: NodeId| id_map.get(&id).copied().unwrap_or(id);

        for edge in self.sectoral.edges() {
            let mut weight = edge.weight;
            if edge.kind == FlowKind::SectorFlow {
                let factor = self.proxy_factor(edge, mapping);
                if factor <= 0.0 {
                    report.proxy_removed += 1;
                    continue;
                }
                if factor < 1.0 {
                    weight *= factor;
                    report.proxy_scaled += 1;
                }
            }
            graph.add_edge(Edge::new(translate(edge.from), translate(edge.to), weight, edge.kind))?;
        }
        for edge in self.process.edges() {
            graph.add_edge(Edge::new(translate(edge.from), translate(edge.to), edge.weight, edge.kind))?;
        }

        for process_links in links {
            report.upstream_suppressed += process_links.suppressed;
            for edge in process_links.upstream.into_iter().chain(process_links.downstream) {
                match edge.kind {
                    FlowKind::UpstreamFlow => report.upstream_created += 1,
                    _ => report.downstream_created += 1,
                }
                graph.add_edge(Edge::new(translate(edge.from), translate(edge.to), edge.weight, edge.kind))?;
            }
        }

        Ok(HybridGraph {
            graph,
            id_map,
            report,
        })
    }
}

/// Reference production of a node; 1.0 when absent or zero
fn production_of(graph: &Graph, id: &NodeId) -> f64 {
    match graph.node(id) {
        Some(node) if node.production != 0.0 => node.production,
        _ => 1.0,
    }
}

/// Edge weight per unit of the receiving node's reference production
///
/// Stored weights are raw amounts; new links are written back in that scale.
#[inline]
fn coefficient(graph: &Graph, edge: &Edge) -> f64 {
    edge.weight / production_of(graph, &edge.to)
}

fn require_kind(graph: &Graph, id: &NodeId, expected: NodeKind) -> Result<()> {
    match graph.node(id) {
        Some(node) if node.kind == expected => Ok(()),
        _ => Err(ConsistencyError::UnknownConcordanceNode { id: *id, expected }.into()),
    }
}
