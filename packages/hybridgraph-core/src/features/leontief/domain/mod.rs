// Leontief Domain Models
//
// Final demand, inventory split categories and the category-labeled
// matrices produced by splitting a production vector.

use ndarray::Array2;

use crate::errors::{Result, StructuralError};
use crate::shared::models::{LabeledVector, NodeId};

/// Final demand: sparse (node, amount) pairs in insertion order
///
/// Setting a node twice keeps the latest amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demand {
    entries: Vec<(NodeId, f64)>,
}

impl Demand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demand for a single node
    pub fn single(id: NodeId, amount: f64) -> Self {
        Self {
            entries: vec![(id, amount)],
        }
    }

    pub fn set(&mut self, id: NodeId, amount: f64) -> &mut Self {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = amount,
            None => self.entries.push((id, amount)),
        }
        self
    }

    pub fn with(mut self, id: NodeId, amount: f64) -> Self {
        self.set(id, amount);
        self
    }

    pub fn entries(&self) -> &[(NodeId, f64)] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(NodeId, f64)> for Demand {
    fn from_iter<I: IntoIterator<Item = (NodeId, f64)>>(iter: I) -> Self {
        let mut demand = Demand::new();
        for (id, amount) in iter {
            demand.set(id, amount);
        }
        demand
    }
}

/// Named categories of production nodes, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySplit {
    categories: Vec<(String, Vec<NodeId>)>,
}

impl InventorySplit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, name: impl Into<String>, ids: Vec<NodeId>) -> Self {
        self.categories.push((name.into(), ids));
        self
    }

    pub fn categories(&self) -> &[(String, Vec<NodeId>)] {
        &self.categories
    }

    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|(name, _)| name.clone()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Matrix with node-labeled rows and category-labeled columns
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatrix {
    pub data: Array2<f64>,
    pub row_ids: Vec<NodeId>,
    pub categories: Vec<String>,
}

impl CategoryMatrix {
    pub fn new(data: Array2<f64>, row_ids: Vec<NodeId>, categories: Vec<String>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != row_ids.len() || cols != categories.len() {
            return Err(StructuralError::DimensionMismatch {
                left: "matrix",
                right: "labels",
                detail: format!(
                    "payload is {}x{}, labels are {}x{}",
                    rows,
                    cols,
                    row_ids.len(),
                    categories.len()
                ),
            }
            .into());
        }
        Ok(Self {
            data,
            row_ids,
            categories,
        })
    }

    /// One category as a labeled vector
    pub fn column(&self, category: &str) -> Option<LabeledVector> {
        let c = self.categories.iter().position(|name| name == category)?;
        LabeledVector::new(self.data.column(c).to_owned(), self.row_ids.clone()).ok()
    }

    /// Sum over categories
    pub fn row_sums(&self) -> LabeledVector {
        LabeledVector {
            data: self.data.sum_axis(ndarray::Axis(1)),
            ids: self.row_ids.clone(),
        }
    }
}

/// Production, inventory and impact vectors of one calculation
#[derive(Debug, Clone, PartialEq)]
pub struct LcaResult {
    pub production: LabeledVector,
    pub inventory: LabeledVector,
    pub impact: LabeledVector,
}
