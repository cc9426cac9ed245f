//! Calculation configuration
//!
//! One document with the settings of every step: import, export and
//! hybridization. Import and export sections left out of the YAML keep their
//! defaults. The import convention and the cutoff policy have none.

use std::path::Path;
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::io::ConfigExportV1;
use super::validation::Validatable;
use crate::errors::UsageError;
use crate::features::hybridization::HybridizationConfig;
use crate::features::matrix_conversion::{ExportOptions, ImportOptions};

/// Supported schema versions
pub const SUPPORTED_VERSIONS: [u32; 1] = [1];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationConfig {
    pub import: ImportOptions,
    pub export: ExportOptions,
    /// `None` when the document names no cutoff policy
    pub hybridization: Option<HybridizationConfig>,
}

impl CalculationConfig {
    /// Load and validate a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loading calculation config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        // Version check
        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = Self {
            import: export.import.unwrap_or_default(),
            export: export.export.unwrap_or_default(),
            hybridization: export.hybridization,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            import: Some(self.import.clone()),
            export: Some(self.export.clone()),
            hybridization: self.hybridization.clone(),
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    /// Hybridization settings, or `MissingCutoffPolicy` when none were given
    pub fn hybridization(&self) -> Result<&HybridizationConfig, UsageError> {
        self.hybridization.as_ref().ok_or(UsageError::MissingCutoffPolicy)
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

impl Validatable for CalculationConfig {
    fn validate(&self) -> ConfigResult<()> {
        match &self.hybridization {
            Some(hybridization) => hybridization.validate(),
            None => Ok(()),
        }
    }

    fn config_name(&self) -> &'static str {
        "CalculationConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::hybridization::CutoffPolicy;
    use crate::features::matrix_conversion::MatrixConvention;
    use crate::shared::models::MatrixFormat;
    use crate::shared::utils::id_generator::IdentifierStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_v1_full() {
        let yaml = r#"
version: 1
import:
  convention: A
  identifiers:
    derive: name
export:
  format: sparse
  normalize: true
  sort_keys:
    production: [name, location]
hybridization:
  cutoff_policy: residual_blending
  downstream: true
  weight_tolerance: 0.001
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = CalculationConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.import.convention, Some(MatrixConvention::Technosphere));
        assert_eq!(config.import.identifiers, IdentifierStrategy::Derive("name".to_string()));
        assert_eq!(config.export.format, MatrixFormat::Sparse);
        assert_eq!(config.export.sort_keys.production, vec!["name", "location"]);
        let hybridization = config.hybridization().unwrap();
        assert_eq!(hybridization.cutoff_policy, CutoffPolicy::ResidualBlending);
        assert!(hybridization.downstream);
        assert!(!hybridization.allow_fractional_mapping);
    }

    #[test]
    fn test_missing_sections_keep_defaults() {
        let config = CalculationConfig::from_yaml_str("version: 1\n").unwrap();
        assert_eq!(config, CalculationConfig::default());
        assert_eq!(config.import.convention, None);
        assert!(matches!(config.hybridization(), Err(UsageError::MissingCutoffPolicy)));

        let config =
            CalculationConfig::from_yaml_str("version: 1\nhybridization:\n  cutoff_policy: full_replacement\n")
                .unwrap();
        assert_eq!(config.hybridization().unwrap().weight_tolerance, 1e-6);
    }

    #[test]
    fn test_hybridization_section_requires_policy() {
        let err = CalculationConfig::from_yaml_str("version: 1\nhybridization:\n  downstream: false\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("cutoff_policy"));
    }

    #[test]
    fn test_missing_version() {
        let err = CalculationConfig::from_yaml_str("export:\n  format: dense\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVersion));
    }

    #[test]
    fn test_unsupported_version() {
        let err = CalculationConfig::from_yaml_str("version: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 2, .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CalculationConfig::from_yaml_str("version: 1\nhybridization:\n  cutof_policy: full_replacement\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = CalculationConfig::from_yaml_str("version: 1\nhybridization:\n  cutoff_policy: partial\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_out_of_range_tolerance() {
        let err = CalculationConfig::from_yaml_str(
            "version: 1\nhybridization:\n  cutoff_policy: full_replacement\n  weight_tolerance: 0.9\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = CalculationConfig::default();
        config.import.convention = Some(MatrixConvention::TechnicalCoefficients);
        config.hybridization = Some(HybridizationConfig::new(CutoffPolicy::FullReplacement).remint_identifiers(true));
        config.export.normalize = false;

        let file = NamedTempFile::new().unwrap();
        config.save_yaml(file.path()).unwrap();
        let loaded = CalculationConfig::from_yaml(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
