mod conversion_usecase;

pub use conversion_usecase::{
    attach_characterization, export_matrix, graph_to_matrices, import_system, system_matrices,
};
