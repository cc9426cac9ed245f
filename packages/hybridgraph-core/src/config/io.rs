//! Configuration I/O (YAML)
//!
//! Defines the on-disk schema. Loading and saving live on
//! [`CalculationConfig`](super::CalculationConfig).

use serde::{Deserialize, Serialize};

use crate::features::hybridization::HybridizationConfig;
use crate::features::matrix_conversion::{ExportOptions, ImportOptions};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hybridization: Option<HybridizationConfig>,
}
