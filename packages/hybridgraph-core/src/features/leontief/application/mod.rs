mod lca_usecase;

pub use lca_usecase::{lca, lca_with_options};
