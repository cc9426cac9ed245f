//! Test fixtures
//!
//! Small process (life-cycle inventory) and sectoral (input-output) systems
//! plus a hand-built two-sector/two-process hybrid system with a known
//! Leontief solution.

use hybridgraph_core::{
    import_system, Edge, FlowKind, Graph, IdentifierStrategy, ImportRequest, MatrixConvention,
    MetadataRecord, Node, NodeId, NodeKind,
};
use ndarray::{array, Array2};
use serde_json::json;
use uuid::Uuid;

pub fn id(n: u128) -> NodeId {
    NodeId::from_uuid(Uuid::from_u128(n))
}

/// One record per name, all with the same unit
pub fn records(names: &[&str], unit: &str) -> Vec<MetadataRecord> {
    names
        .iter()
        .map(|name| json!({"name": name, "unit": unit}).as_object().cloned().unwrap())
        .collect()
}

// ============================================================
// Process system (technosphere convention)
// ============================================================

pub fn a_p() -> Array2<f64> {
    array![[1.0, 0.0, 0.0], [2.0, 1.0, 0.2], [0.0, 3.3, 1.0]]
}

pub fn a_p_metadata() -> Vec<MetadataRecord> {
    [
        json!({"name": "Product 1", "unit": "kg", "location": "CH", "code": "123abc"}),
        json!({"name": "Product 2", "unit": "kg", "location": "CH", "code": "456def"}),
        json!({"name": "Product 3", "unit": "kg", "location": "CH", "code": "789ghi"}),
    ]
    .iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect()
}

pub fn b_p() -> Array2<f64> {
    array![[3.5, 2.1, 4.0], [0.8, 1.5, 0.0]]
}

pub fn b_p_metadata() -> Vec<MetadataRecord> {
    [
        json!({"name": "Emission 1 (Biosphere)", "unit": "kg(CO2 eq.)", "compartment": "air"}),
        json!({"name": "Emission 2 (Biosphere)", "unit": "kg(CO2 eq.)", "compartment": "air"}),
    ]
    .iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect()
}

pub fn process_request() -> ImportRequest {
    ImportRequest::new("lci", NodeKind::Process, a_p(), a_p_metadata())
        .with_extension(b_p(), b_p_metadata())
        .convention(MatrixConvention::Technosphere)
        .identifiers(IdentifierStrategy::Derive("code".to_string()))
}

pub fn process_system() -> Graph {
    import_system(&process_request()).unwrap()
}

// ============================================================
// Sectoral system (technical coefficients)
// ============================================================

pub fn a_s() -> Array2<f64> {
    array![
        [0.2008, 0.0000, 0.0011, 0.0338],
        [0.0010, 0.0658, 0.0035, 0.0219],
        [0.0034, 0.0002, 0.0012, 0.0021],
        [0.1247, 0.0684, 0.1801, 0.2319]
    ]
}

pub fn a_s_metadata() -> Vec<MetadataRecord> {
    ["Sector A", "Sector B", "Sector C", "Sector D"]
        .iter()
        .map(|name| json!({"name": name, "unit": "CHF", "location": "CH"}).as_object().cloned().unwrap())
        .collect()
}

pub fn b_s() -> Array2<f64> {
    array![[1.2, 3.4, 5.6, 7.8]]
}

pub fn sectoral_request() -> ImportRequest {
    ImportRequest::new("io", NodeKind::Sector, a_s(), a_s_metadata())
        .convention(MatrixConvention::TechnicalCoefficients)
        .with_extension(b_s(), records(&["Emission 3 (Satellite)"], "kg(CO2 eq.)"))
        .identifiers(IdentifierStrategy::Derive("name".to_string()))
}

pub fn sectoral_system() -> Graph {
    import_system(&sectoral_request()).unwrap()
}

// ============================================================
// Two-sector / two-process hybrid system
// ============================================================

/// Identifiers of the hand-built hybrid system
pub struct HybridExample {
    pub sector_a: NodeId,
    pub sector_b: NodeId,
    pub process_1: NodeId,
    pub process_2: NodeId,
    pub satellite: NodeId,
    pub emission_1: NodeId,
    pub emission_2: NodeId,
    pub gwp: NodeId,
}

/// A_S = [[0.1, 0.2], [0.3, 0.4]], A_P = [[0, 0.5], [0.2, 0]],
/// C^U = 0.1 at (sector A, process 2), B_S = [[2, 1]], B_P = [[1, 0], [0, 3]],
/// Q = [1, 2, 3] over (satellite, emission 1, emission 2)
pub fn hybrid_example() -> (Graph, HybridExample) {
    let ids = HybridExample {
        sector_a: id(1),
        sector_b: id(2),
        process_1: id(11),
        process_2: id(12),
        satellite: id(21),
        emission_1: id(22),
        emission_2: id(23),
        gwp: id(31),
    };

    let mut g = Graph::new("hybrid example");
    let nodes = [
        (ids.sector_a, NodeKind::Sector, "Sector A", "USD"),
        (ids.sector_b, NodeKind::Sector, "Sector B", "USD"),
        (ids.process_1, NodeKind::Process, "Process 1", "kg"),
        (ids.process_2, NodeKind::Process, "Process 2", "kg"),
        (ids.satellite, NodeKind::Extension, "Satellite", "kg"),
        (ids.emission_1, NodeKind::Extension, "Emission 1", "kg"),
        (ids.emission_2, NodeKind::Extension, "Emission 2", "kg"),
        (ids.gwp, NodeKind::Indicator, "GWP", "kg CO2-eq"),
    ];
    for (node_id, kind, name, unit) in nodes {
        g.add_node(Node::builder(node_id, kind, name, unit).build()).unwrap();
    }

    let edges = [
        (ids.sector_a, ids.sector_a, 0.1, FlowKind::SectorFlow),
        (ids.sector_a, ids.sector_b, 0.2, FlowKind::SectorFlow),
        (ids.sector_b, ids.sector_a, 0.3, FlowKind::SectorFlow),
        (ids.sector_b, ids.sector_b, 0.4, FlowKind::SectorFlow),
        (ids.process_1, ids.process_2, 0.5, FlowKind::ProcessFlow),
        (ids.process_2, ids.process_1, 0.2, FlowKind::ProcessFlow),
        (ids.sector_a, ids.process_2, 0.1, FlowKind::UpstreamFlow),
        (ids.satellite, ids.sector_a, 2.0, FlowKind::ElementaryFlow),
        (ids.satellite, ids.sector_b, 1.0, FlowKind::ElementaryFlow),
        (ids.emission_1, ids.process_1, 1.0, FlowKind::ElementaryFlow),
        (ids.emission_2, ids.process_2, 3.0, FlowKind::ElementaryFlow),
        (ids.gwp, ids.satellite, 1.0, FlowKind::Characterization),
        (ids.gwp, ids.emission_1, 2.0, FlowKind::Characterization),
        (ids.gwp, ids.emission_2, 3.0, FlowKind::Characterization),
    ];
    for (from, to, weight, kind) in edges {
        g.add_edge(Edge::new(from, to, weight, kind)).unwrap();
    }

    (g, ids)
}

/// Install a test subscriber once; ignored when one is already set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
