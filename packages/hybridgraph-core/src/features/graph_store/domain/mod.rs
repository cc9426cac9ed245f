// Graph Store Domain Model
//
// Typed directed multigraph over one system (or one merged hybrid system).
// Storage is a petgraph arena with stable handles (no removals), a side
// NodeId -> handle map and a per-kind index in insertion order. Views are
// borrowed iterators; node data is never copied out.

mod kind_index;

use ahash::{AHashMap, AHashSet};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde_json::Value;

use crate::errors::{ConsistencyError, NumericError, Result, StructuralError, UsageError};
use crate::shared::models::{is_scalar, Edge, FlowKind, Node, NodeId, NodeKind, RESERVED_KEYS};

pub use kind_index::KindIndex;

// ============================================================
// Graph
// ============================================================

/// In-memory graph of sector, process, extension and indicator nodes
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    inner: DiGraph<Node, Edge>,
    by_id: AHashMap<NodeId, NodeIndex>,
    kinds: KindIndex,
    /// (from, to, kind) of every stored edge
    edge_keys: AHashSet<(NodeIndex, NodeIndex, FlowKind)>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: DiGraph::new(),
            by_id: AHashMap::new(),
            kinds: KindIndex::new(),
            edge_keys: AHashSet::new(),
        }
    }

    pub fn with_capacity(name: impl Into<String>, nodes: usize, edges: usize) -> Self {
        Self {
            name: name.into(),
            inner: DiGraph::with_capacity(nodes, edges),
            by_id: AHashMap::with_capacity(nodes),
            kinds: KindIndex::new(),
            edge_keys: AHashSet::with_capacity(edges),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------

    /// Insert a node; an identifier already present is rejected, never overwritten
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.by_id.contains_key(&node.id) {
            return Err(StructuralError::DuplicateNode(node.id).into());
        }
        let id = node.id;
        let kind = node.kind;
        let index = self.inner.add_node(node);
        self.by_id.insert(id, index);
        self.kinds.insert(kind, index);
        Ok(())
    }

    /// Insert an edge between two known nodes
    ///
    /// Parallel edges between one ordered pair must differ in kind.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let from = self.handle(&edge.from)?;
        let to = self.handle(&edge.to)?;
        if !edge.weight.is_finite() {
            return Err(NumericError::NonFiniteWeight {
                from: edge.from,
                to: edge.to,
                value: edge.weight,
            }
            .into());
        }
        if !self.edge_keys.insert((from, to, edge.kind)) {
            return Err(ConsistencyError::DuplicateEdge {
                from: edge.from,
                to: edge.to,
                kind: edge.kind,
            }
            .into());
        }
        self.inner.add_edge(from, to, edge);
        Ok(())
    }

    /// Set one open metadata entry; the only mutation allowed on an inserted node
    pub fn update_metadata(&mut self, id: &NodeId, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(UsageError::ReservedMetadataKey(key).into());
        }
        let index = self.handle(id)?;
        if !is_scalar(&value) {
            return Err(StructuralError::NonScalarMetadata {
                group: "update",
                index: index.index(),
                key,
            }
            .into());
        }
        self.inner[index].metadata.insert(key, value);
        Ok(())
    }

    fn handle(&self, id: &NodeId) -> Result<NodeIndex> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| StructuralError::UnknownNode(*id).into())
    }

    // ------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------

    #[inline]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.by_id.get(id).map(|&index| &self.inner[index])
    }

    #[inline]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    #[inline]
    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.kinds.count(kind)
    }

    /// Edge of the given kind from `from` to `to`
    pub fn edge_between(&self, from: &NodeId, to: &NodeId, kind: FlowKind) -> Option<&Edge> {
        let a = *self.by_id.get(from)?;
        let b = *self.by_id.get(to)?;
        self.inner
            .edges_connecting(a, b)
            .map(|e| e.weight())
            .find(|e| e.kind == kind)
    }

    // ------------------------------------------------------------
    // Views
    // ------------------------------------------------------------

    /// All nodes, insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.inner.node_weights()
    }

    /// Nodes of one kind, insertion order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> + '_ {
        self.kinds.get(kind).iter().map(move |&index| &self.inner[index])
    }

    /// Sector and process nodes, insertion order
    pub fn production_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.inner.node_weights().filter(|n| n.kind.is_production())
    }

    /// All edges, insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.inner.edge_weights()
    }

    pub fn edges_of_kind(&self, kind: FlowKind) -> impl Iterator<Item = &Edge> + '_ {
        self.inner.edge_weights().filter(move |e| e.kind == kind)
    }

    /// Incoming edges of a node; empty for unknown ids
    pub fn edges_into(&self, id: &NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(id, Direction::Incoming)
    }

    /// Outgoing edges of a node; empty for unknown ids
    pub fn edges_from(&self, id: &NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(id, Direction::Outgoing)
    }

    fn adjacent(&self, id: &NodeId, direction: Direction) -> impl Iterator<Item = &Edge> + '_ {
        self.by_id
            .get(id)
            .copied()
            .into_iter()
            .flat_map(move |index| self.inner.edges_directed(index, direction).map(|e| e.weight()))
    }

    /// Node and edge counts per kind
    pub fn stats(&self) -> GraphStats {
        let mut edges_by_kind: AHashMap<FlowKind, usize> = AHashMap::new();
        for edge in self.inner.edge_weights() {
            *edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }
        GraphStats {
            node_count: self.len(),
            edge_count: self.edge_count(),
            nodes_by_kind: NodeKind::ALL
                .iter()
                .map(|&kind| (kind, self.kinds.count(kind)))
                .filter(|(_, count)| *count > 0)
                .collect(),
            edges_by_kind,
        }
    }
}

/// Graph statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: AHashMap<NodeKind, usize>,
    pub edges_by_kind: AHashMap<FlowKind, usize>,
}

impl GraphStats {
    pub fn nodes_of(&self, kind: NodeKind) -> usize {
        self.nodes_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn edges_of(&self, kind: FlowKind) -> usize {
        self.edges_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HybridGraphError;
    use serde_json::json;
    use uuid::Uuid;

    fn id(n: u128) -> NodeId {
        NodeId::from_uuid(Uuid::from_u128(n))
    }

    fn node(n: u128, kind: NodeKind) -> Node {
        Node::builder(id(n), kind, format!("node {}", n), "kg").build()
    }

    fn small_graph() -> Graph {
        let mut graph = Graph::new("test");
        graph.add_node(node(1, NodeKind::Process)).unwrap();
        graph.add_node(node(2, NodeKind::Process)).unwrap();
        graph.add_node(node(3, NodeKind::Extension)).unwrap();
        graph
            .add_edge(Edge::new(id(1), id(2), 0.5, FlowKind::ProcessFlow))
            .unwrap();
        graph
            .add_edge(Edge::new(id(3), id(1), 2.0, FlowKind::ElementaryFlow))
            .unwrap();
        graph
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = small_graph();
        let err = graph.add_node(node(1, NodeKind::Sector)).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(graph.node(&id(1)).unwrap().kind, NodeKind::Process);
    }

    #[test]
    fn test_edge_to_unknown_node() {
        let mut graph = small_graph();
        let err = graph
            .add_edge(Edge::new(id(1), id(99), 1.0, FlowKind::ProcessFlow))
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_non_finite_weight() {
        let mut graph = small_graph();
        let err = graph
            .add_edge(Edge::new(id(2), id(1), f64::NAN, FlowKind::ProcessFlow))
            .unwrap_err();
        assert!(err.is_numeric());
    }

    #[test]
    fn test_parallel_edges_need_distinct_kinds() {
        let mut graph = small_graph();
        let err = graph
            .add_edge(Edge::new(id(1), id(2), 1.0, FlowKind::ProcessFlow))
            .unwrap_err();
        assert!(err.is_consistency());

        graph
            .add_edge(Edge::new(id(1), id(2), 1.0, FlowKind::DownstreamFlow))
            .unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.edge_between(&id(1), &id(2), FlowKind::DownstreamFlow).map(|e| e.weight),
            Some(1.0)
        );
    }

    #[test]
    fn test_views() {
        let graph = small_graph();
        let processes: Vec<NodeId> = graph.nodes_of_kind(NodeKind::Process).map(|n| n.id).collect();
        assert_eq!(processes, vec![id(1), id(2)]);
        assert_eq!(graph.production_nodes().count(), 2);
        assert_eq!(graph.edges_into(&id(1)).count(), 1);
        assert_eq!(graph.edges_from(&id(1)).count(), 1);
        assert_eq!(graph.edges_from(&id(42)).count(), 0);
        assert_eq!(graph.edges_of_kind(FlowKind::ElementaryFlow).count(), 1);
    }

    #[test]
    fn test_update_metadata() {
        let mut graph = small_graph();
        graph.update_metadata(&id(1), "location", json!("CH")).unwrap();
        assert_eq!(graph.node(&id(1)).unwrap().attribute("location"), Some(json!("CH")));

        assert!(graph.update_metadata(&id(1), "name", json!("x")).unwrap_err().is_usage());
        for key in ["kind", "type"] {
            assert!(matches!(
                graph.update_metadata(&id(1), key, json!("market")).unwrap_err(),
                HybridGraphError::Usage(UsageError::ReservedMetadataKey(_))
            ));
        }
        assert!(graph
            .update_metadata(&id(1), "tags", json!(["a", "b"]))
            .unwrap_err()
            .is_structural());
        assert!(graph.update_metadata(&id(77), "location", json!("CH")).is_err());
    }

    #[test]
    fn test_stats() {
        let stats = small_graph().stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.nodes_of(NodeKind::Process), 2);
        assert_eq!(stats.nodes_of(NodeKind::Sector), 0);
        assert_eq!(stats.edges_of(FlowKind::ElementaryFlow), 1);
    }

    #[test]
    fn test_graph_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Graph>();
    }
}
