// Concordance Hybridization
//
// Merges a sectoral (input-output) graph and a process (life-cycle
// inventory) graph through a sector x process concordance. Process data is
// linked to its sectoral proxy with upstream (sector -> process) and,
// optionally, downstream (process -> sector) flows; the cutoff policy
// decides how much of the proxy survives.
//
// ## Architecture
// - Domain: Concordance, CutoffPolicy, HybridizationConfig, HybridGraph
// - Infrastructure: Hybridizer (per-process links in parallel)
// - Application: timed entry points

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{hybridize, hybridize_with_report};
pub use domain::{Concordance, CutoffPolicy, HybridGraph, HybridizationConfig, HybridizationReport};
