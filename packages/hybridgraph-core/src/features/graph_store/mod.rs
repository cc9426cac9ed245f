// Graph Store
//
// In-memory typed multigraph holding one system's nodes and edges.
//
// ## Architecture
// - Domain: Graph (petgraph arena + id map + per-kind index), GraphStats

pub mod domain;

pub use domain::{Graph, GraphStats};
