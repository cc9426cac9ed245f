pub mod solver;

pub use solver::{
    impact_matrix, impact_vector, inventory_matrix, inventory_vector, production_vector, LeontiefInverse,
};
