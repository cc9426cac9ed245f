//! Feature modules
//!
//! Leaves first: graph store, matrix conversion, hybridization, Leontief.

pub mod graph_store;
pub mod hybridization;
pub mod leontief;
pub mod matrix_conversion;
