// Leontief Calculator
//
// Demand -> production (x = (I - A)^-1 f) -> inventory (g = B x)
// -> impact (h = Q g), plus per-category inventory/impact splits.
//
// ## Architecture
// - Domain: Demand, InventorySplit, CategoryMatrix, LcaResult
// - Infrastructure: nalgebra LU solver, LeontiefInverse
// - Application: `lca` composition over a graph

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{lca, lca_with_options};
pub use domain::{CategoryMatrix, Demand, InventorySplit, LcaResult};
pub use infrastructure::{
    impact_matrix, impact_vector, inventory_matrix, inventory_vector, production_vector, LeontiefInverse,
};
