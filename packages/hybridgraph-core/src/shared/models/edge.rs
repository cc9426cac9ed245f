//! Edge model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::{NodeId, NodeKind};

/// Edge kind (flow classification)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Within the process system (A_P entry)
    ProcessFlow,
    /// Within the sectoral system (A_S entry)
    SectorFlow,
    /// Sector -> process, cutoff-derived (C^U entry)
    UpstreamFlow,
    /// Process -> sector (C^D entry)
    DownstreamFlow,
    /// Extension -> production node (B entry)
    ElementaryFlow,
    /// Indicator -> extension node (Q entry)
    Characterization,
}

impl FlowKind {
    /// Flows that belong in the production matrix
    #[inline]
    pub fn is_production_flow(&self) -> bool {
        matches!(
            self,
            FlowKind::ProcessFlow
                | FlowKind::SectorFlow
                | FlowKind::UpstreamFlow
                | FlowKind::DownstreamFlow
        )
    }

    /// Flow kind for an entry within the production matrix of one system
    pub fn internal_to(kind: NodeKind) -> Option<FlowKind> {
        match kind {
            NodeKind::Sector => Some(FlowKind::SectorFlow),
            NodeKind::Process => Some(FlowKind::ProcessFlow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::ProcessFlow => "process_flow",
            FlowKind::SectorFlow => "sector_flow",
            FlowKind::UpstreamFlow => "upstream_flow",
            FlowKind::DownstreamFlow => "downstream_flow",
            FlowKind::ElementaryFlow => "elementary_flow",
            FlowKind::Characterization => "characterization",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directed, weighted edge
///
/// A matrix entry `M[i, j]` becomes an edge from the row-`i` node to the
/// column-`j` node carrying the entry as `weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    pub kind: FlowKind,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, weight: f64, kind: FlowKind) -> Self {
        Self {
            from,
            to,
            weight,
            kind,
        }
    }
}
