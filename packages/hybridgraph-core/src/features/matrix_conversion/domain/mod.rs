// Matrix Conversion Domain Models
//
// Requests and options for moving between coefficient matrices and graphs.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::UsageError;
use crate::shared::models::{LabeledMatrix, MatrixFormat, MetadataRecord, NodeKind};
use crate::shared::utils::id_generator::IdentifierStrategy;

// ============================================================
// Matrix Convention
// ============================================================

/// How the production matrix of an import is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixConvention {
    /// Technical coefficients per unit output; every node produces 1.0
    #[serde(rename = "I-A")]
    TechnicalCoefficients,
    /// Technosphere matrix: reference production on the diagonal, inputs off it
    #[serde(rename = "A")]
    Technosphere,
}

impl MatrixConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalCoefficients => "I-A",
            Self::Technosphere => "A",
        }
    }

    /// Parse convention from string
    pub fn from_str(s: &str) -> Result<Self, UsageError> {
        match s.trim() {
            "I-A" => Ok(Self::TechnicalCoefficients),
            "A" => Ok(Self::Technosphere),
            _ => Err(UsageError::UnknownConvention(s.to_string())),
        }
    }
}

impl fmt::Display for MatrixConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================
// Matrix Role
// ============================================================

/// Which matrix of a system an export produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixRole {
    /// Square, production x production (A)
    Production,
    /// Extension x production (B)
    Extension,
    /// Indicator x extension (Q)
    Indicator,
}

impl MatrixRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixRole::Production => "production",
            MatrixRole::Extension => "extension",
            MatrixRole::Indicator => "indicator",
        }
    }
}

impl fmt::Display for MatrixRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================
// Import
// ============================================================

/// Import settings shared by every request of a run
///
/// The convention has no default: an import without one is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convention: Option<MatrixConvention>,
    pub identifiers: IdentifierStrategy,
}

impl ImportOptions {
    /// The declared convention, or `MissingConvention`
    pub fn require_convention(&self) -> Result<MatrixConvention, UsageError> {
        self.convention.ok_or(UsageError::MissingConvention)
    }
}

/// One system to import: matrices plus one metadata record per row/column
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Name of the originating system, stored on every node
    pub system: String,
    /// Kind of the production nodes (sector or process)
    pub production_kind: NodeKind,
    /// Square production matrix (A)
    pub production: Array2<f64>,
    pub production_metadata: Vec<MetadataRecord>,
    /// Extension matrix (B), extension x production
    pub extension: Option<Array2<f64>>,
    pub extension_metadata: Vec<MetadataRecord>,
    /// Indicator matrix (Q), indicator x extension
    pub indicator: Option<Array2<f64>>,
    pub indicator_metadata: Vec<MetadataRecord>,
    pub options: ImportOptions,
}

impl ImportRequest {
    pub fn new(
        system: impl Into<String>,
        production_kind: NodeKind,
        production: Array2<f64>,
        production_metadata: Vec<MetadataRecord>,
    ) -> Self {
        Self {
            system: system.into(),
            production_kind,
            production,
            production_metadata,
            extension: None,
            extension_metadata: Vec::new(),
            indicator: None,
            indicator_metadata: Vec::new(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_extension(mut self, extension: Array2<f64>, metadata: Vec<MetadataRecord>) -> Self {
        self.extension = Some(extension);
        self.extension_metadata = metadata;
        self
    }

    pub fn with_indicator(mut self, indicator: Array2<f64>, metadata: Vec<MetadataRecord>) -> Self {
        self.indicator = Some(indicator);
        self.indicator_metadata = metadata;
        self
    }

    pub fn convention(mut self, convention: MatrixConvention) -> Self {
        self.options.convention = Some(convention);
        self
    }

    pub fn identifiers(mut self, identifiers: IdentifierStrategy) -> Self {
        self.options.identifiers = identifiers;
        self
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Indicator matrix whose columns are identified by extension names
#[derive(Debug, Clone)]
pub struct CharacterizationRequest {
    /// Q, indicator x extension-name
    pub indicator: Array2<f64>,
    pub indicator_metadata: Vec<MetadataRecord>,
    /// One name per column of `indicator`
    pub extension_names: Vec<String>,
    /// System name stored on the indicator nodes
    pub system: String,
    pub identifiers: IdentifierStrategy,
}

impl CharacterizationRequest {
    pub fn new(
        indicator: Array2<f64>,
        indicator_metadata: Vec<MetadataRecord>,
        extension_names: Vec<String>,
    ) -> Self {
        Self {
            indicator,
            indicator_metadata,
            extension_names,
            system: String::new(),
            identifiers: IdentifierStrategy::Mint,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn identifiers(mut self, identifiers: IdentifierStrategy) -> Self {
        self.identifiers = identifiers;
        self
    }
}

// ============================================================
// Export
// ============================================================

/// Attribute keys ordering the nodes of each role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortKeys {
    pub production: Vec<String>,
    pub extension: Vec<String>,
    pub indicator: Vec<String>,
}

impl SortKeys {
    pub fn for_role(&self, role: MatrixRole) -> &[String] {
        match role {
            MatrixRole::Production => &self.production,
            MatrixRole::Extension => &self.extension,
            MatrixRole::Indicator => &self.indicator,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    pub format: MatrixFormat,
    /// Divide each column by the reference production of its column node
    pub normalize: bool,
    pub sort_keys: SortKeys,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: MatrixFormat::Dense,
            normalize: true,
            sort_keys: SortKeys::default(),
        }
    }
}

impl ExportOptions {
    pub fn format(mut self, format: MatrixFormat) -> Self {
        self.format = format;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn sort_by(mut self, role: MatrixRole, keys: &[&str]) -> Self {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        match role {
            MatrixRole::Production => self.sort_keys.production = keys,
            MatrixRole::Extension => self.sort_keys.extension = keys,
            MatrixRole::Indicator => self.sort_keys.indicator = keys,
        }
        self
    }
}

/// The three matrices of a system with mutually aligned axes
///
/// `b.col_ids == a.row_ids` and `q.col_ids == b.row_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemMatrices {
    pub a: LabeledMatrix,
    pub b: Option<LabeledMatrix>,
    pub q: Option<LabeledMatrix>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_parsing() {
        assert_eq!(
            MatrixConvention::from_str("I-A").unwrap(),
            MatrixConvention::TechnicalCoefficients
        );
        assert_eq!(MatrixConvention::from_str("A").unwrap(), MatrixConvention::Technosphere);
        assert!(matches!(
            MatrixConvention::from_str("A-I"),
            Err(UsageError::UnknownConvention(_))
        ));
        assert_eq!(MatrixConvention::Technosphere.to_string(), "A");
    }

    #[test]
    fn test_convention_serde_names() {
        let parsed: MatrixConvention = serde_yaml::from_str("I-A").unwrap();
        assert_eq!(parsed, MatrixConvention::TechnicalCoefficients);
        assert!(serde_yaml::from_str::<MatrixConvention>("B").is_err());
    }

    #[test]
    fn test_import_options_require_convention() {
        let options = ImportOptions::default();
        assert!(matches!(
            options.require_convention(),
            Err(UsageError::MissingConvention)
        ));

        let parsed: ImportOptions = serde_yaml::from_str("convention: A\n").unwrap();
        assert_eq!(parsed.require_convention().unwrap(), MatrixConvention::Technosphere);
    }

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::default()
            .format(MatrixFormat::Sparse)
            .sort_by(MatrixRole::Extension, &["name", "compartment"]);
        assert!(options.normalize);
        assert_eq!(options.sort_keys.for_role(MatrixRole::Extension), &["name", "compartment"]);
        assert!(options.sort_keys.for_role(MatrixRole::Production).is_empty());
    }
}
