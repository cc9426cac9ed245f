pub mod characterization;
pub mod exporter;
pub mod importer;
pub mod scan;

pub use characterization::CharacterizationAttacher;
pub use exporter::{metadata_records, order_nodes, MatrixExporter};
pub use importer::SystemImporter;
