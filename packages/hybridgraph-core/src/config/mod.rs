//! Calculation Configuration
//!
//! Versioned YAML schema (v1) covering import, export and hybridization
//! settings, with range validation through [`Validatable`].
//!
//! ```rust,ignore
//! use hybridgraph_core::config::CalculationConfig;
//!
//! let config = CalculationConfig::from_yaml("hybrid-lca.yaml")?;
//! let graph = hybridize(&io, &lci, &concordance, config.hybridization()?)?;
//! ```

pub mod calculation_config;
pub mod error;
pub mod io;
pub mod validation;

pub use calculation_config::{CalculationConfig, SUPPORTED_VERSIONS};
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigExportV1;
pub use validation::Validatable;
