// Hybridization Domain Models
//
// Concordance mapping, cutoff policy and the result of merging a sectoral
// and a process system into one hybrid graph.

use ahash::AHashMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ConfigError, ConfigResult, Validatable};
use crate::errors::{Result, StructuralError, UsageError};
use crate::features::graph_store::Graph;
use crate::shared::models::{LabeledMatrix, NodeId};

// ============================================================
// Cutoff Policy
// ============================================================

/// How process data and sectoral proxy data are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffPolicy {
    /// Process data supersedes the sectoral proxy wherever it exists
    FullReplacement,
    /// Sectoral inputs are added only for the part process data does not cover
    ResidualBlending,
}

impl CutoffPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullReplacement => "full_replacement",
            Self::ResidualBlending => "residual_blending",
        }
    }

    /// Parse policy from string
    pub fn from_str(s: &str) -> std::result::Result<Self, UsageError> {
        match s.to_lowercase().as_str() {
            "full_replacement" => Ok(Self::FullReplacement),
            "residual_blending" => Ok(Self::ResidualBlending),
            _ => Err(UsageError::UnknownCutoffPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for CutoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================
// Configuration
// ============================================================

fn default_weight_tolerance() -> f64 {
    1e-6
}

/// Hybridization settings
///
/// The cutoff policy is required: there is no default and the YAML section
/// fails to parse without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HybridizationConfig {
    pub cutoff_policy: CutoffPolicy,
    /// Also link processes to the customers of their sectors
    #[serde(default)]
    pub downstream: bool,
    /// Permit a process to map to more than one sector
    #[serde(default)]
    pub allow_fractional_mapping: bool,
    /// Allowed deviation of a concordance column sum from 1 (0, 0.5]
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,
    /// Assign fresh identifiers to every node of the hybrid graph
    #[serde(default)]
    pub remint_identifiers: bool,
    /// Processes to hybridize; all concordance columns when `None`
    #[serde(skip)]
    pub processes: Option<Vec<NodeId>>,
}

impl HybridizationConfig {
    pub fn new(cutoff_policy: CutoffPolicy) -> Self {
        Self {
            cutoff_policy,
            downstream: false,
            allow_fractional_mapping: false,
            weight_tolerance: default_weight_tolerance(),
            remint_identifiers: false,
            processes: None,
        }
    }

    pub fn cutoff_policy(mut self, policy: CutoffPolicy) -> Self {
        self.cutoff_policy = policy;
        self
    }

    pub fn downstream(mut self, enabled: bool) -> Self {
        self.downstream = enabled;
        self
    }

    pub fn allow_fractional_mapping(mut self, allowed: bool) -> Self {
        self.allow_fractional_mapping = allowed;
        self
    }

    pub fn weight_tolerance(mut self, tolerance: f64) -> Self {
        self.weight_tolerance = tolerance;
        self
    }

    pub fn remint_identifiers(mut self, remint: bool) -> Self {
        self.remint_identifiers = remint;
        self
    }

    pub fn processes(mut self, processes: Vec<NodeId>) -> Self {
        self.processes = Some(processes);
        self
    }
}

impl Validatable for HybridizationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !(self.weight_tolerance > 0.0 && self.weight_tolerance <= 0.5) {
            return Err(ConfigError::range_with_hint(
                "hybridization.weight_tolerance",
                self.weight_tolerance,
                "0 (exclusive)",
                0.5,
                "Concordance column sums are compared to 1 within this tolerance",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "HybridizationConfig"
    }
}

// ============================================================
// Concordance
// ============================================================

/// Sector x process correspondence matrix (H)
///
/// `H[s, p] != 0` asserts that sector `s` corresponds to process `p`; the
/// value is the share of `p` attributed to `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct Concordance {
    matrix: LabeledMatrix,
}

impl Concordance {
    pub fn new(matrix: LabeledMatrix) -> Self {
        Self { matrix }
    }

    pub fn from_dense(weights: Array2<f64>, sectors: Vec<NodeId>, processes: Vec<NodeId>) -> Result<Self> {
        Ok(Self::new(LabeledMatrix::dense(weights, sectors, processes)?))
    }

    /// Build from explicit (sector, process, weight) triples
    pub fn from_pairs(
        sectors: Vec<NodeId>,
        processes: Vec<NodeId>,
        pairs: &[(NodeId, NodeId, f64)],
    ) -> Result<Self> {
        let sector_pos: AHashMap<NodeId, usize> =
            sectors.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let process_pos: AHashMap<NodeId, usize> =
            processes.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut weights = Array2::<f64>::zeros((sectors.len(), processes.len()));
        for (sector, process, weight) in pairs {
            let s = sector_pos
                .get(sector)
                .ok_or(StructuralError::UnknownNode(*sector))?;
            let p = process_pos
                .get(process)
                .ok_or(StructuralError::UnknownNode(*process))?;
            weights[[*s, *p]] += weight;
        }
        Self::from_dense(weights, sectors, processes)
    }

    #[inline]
    pub fn sectors(&self) -> &[NodeId] {
        &self.matrix.row_ids
    }

    #[inline]
    pub fn processes(&self) -> &[NodeId] {
        &self.matrix.col_ids
    }

    pub fn matrix(&self) -> &LabeledMatrix {
        &self.matrix
    }

    /// Non-zero (sector, process, weight) entries, row-major
    pub fn entries(&self) -> Vec<(NodeId, NodeId, f64)> {
        self.matrix
            .nonzero_entries()
            .into_iter()
            .map(|(r, c, v)| (self.matrix.row_ids[r], self.matrix.col_ids[c], v))
            .collect()
    }
}

// ============================================================
// Result
// ============================================================

/// Counts describing what hybridization did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HybridizationReport {
    pub upstream_created: usize,
    /// Upstream links omitted because process data already covers them
    pub upstream_suppressed: usize,
    pub downstream_created: usize,
    /// Sectoral proxy edges with reduced weight
    pub proxy_scaled: usize,
    /// Sectoral proxy edges scaled to zero and dropped
    pub proxy_removed: usize,
}

/// Hybrid graph together with its identifier map and report
#[derive(Debug, Clone)]
pub struct HybridGraph {
    pub graph: Graph,
    /// Input id -> hybrid id; empty unless identifiers were reminted
    pub id_map: AHashMap<NodeId, NodeId>,
    pub report: HybridizationReport,
}

impl HybridGraph {
    /// Identifier of an input node inside the hybrid graph
    pub fn resolve(&self, id: &NodeId) -> NodeId {
        self.id_map.get(id).copied().unwrap_or(*id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_cutoff_policy_parsing() {
        assert_eq!(
            CutoffPolicy::from_str("residual_blending").unwrap(),
            CutoffPolicy::ResidualBlending
        );
        assert!(matches!(
            CutoffPolicy::from_str("partial"),
            Err(UsageError::UnknownCutoffPolicy(_))
        ));
        assert_eq!(CutoffPolicy::FullReplacement.to_string(), "full_replacement");
    }

    #[test]
    fn test_weight_tolerance_range() {
        let config = HybridizationConfig::new(CutoffPolicy::FullReplacement);
        assert!(config.validate().is_ok());
        assert!(config.clone().weight_tolerance(0.0).validate().is_err());
        assert!(config.clone().weight_tolerance(0.6).validate().is_err());
        assert!(config.weight_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_cutoff_policy_must_be_named() {
        let err = serde_yaml::from_str::<HybridizationConfig>("downstream: true\n").unwrap_err();
        assert!(err.to_string().contains("cutoff_policy"));

        let config: HybridizationConfig = serde_yaml::from_str("cutoff_policy: residual_blending\n").unwrap();
        assert_eq!(config, HybridizationConfig::new(CutoffPolicy::ResidualBlending));
    }

    #[test]
    fn test_concordance_from_pairs() {
        let s = NodeId::from_uuid(Uuid::from_u128(1));
        let p = NodeId::from_uuid(Uuid::from_u128(2));
        let h = Concordance::from_pairs(vec![s], vec![p], &[(s, p, 1.0)]).unwrap();
        assert_eq!(h.entries(), vec![(s, p, 1.0)]);
        assert!(Concordance::from_pairs(vec![s], vec![p], &[(p, s, 1.0)]).is_err());
    }
}
