//! Per-kind node index
//!
//! Keeps node handles grouped by kind, each group in insertion order.

use ahash::AHashMap;
use petgraph::graph::NodeIndex;

use crate::shared::models::NodeKind;

#[derive(Debug, Clone, Default)]
pub struct KindIndex {
    by_kind: AHashMap<NodeKind, Vec<NodeIndex>>,
}

impl KindIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, kind: NodeKind, index: NodeIndex) {
        self.by_kind.entry(kind).or_default().push(index);
    }

    /// Handles of one kind, insertion order (O(1))
    #[inline]
    pub fn get(&self, kind: NodeKind) -> &[NodeIndex] {
        self.by_kind.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    #[inline]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.get(kind).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_index_keeps_insertion_order() {
        let mut index = KindIndex::new();
        index.insert(NodeKind::Process, NodeIndex::new(2));
        index.insert(NodeKind::Sector, NodeIndex::new(0));
        index.insert(NodeKind::Process, NodeIndex::new(1));

        assert_eq!(index.get(NodeKind::Process), &[NodeIndex::new(2), NodeIndex::new(1)]);
        assert_eq!(index.count(NodeKind::Sector), 1);
        assert!(index.get(NodeKind::Indicator).is_empty());
    }
}
