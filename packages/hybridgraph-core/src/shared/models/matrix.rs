//! Labeled matrices and vectors
//!
//! The pairing between an array index and a node identity is not inherent to
//! the array, so every matrix and vector travels together with its ordered
//! identifier sequence(s). Constructors reject a payload whose shape does not
//! match its labels.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use std::fmt;

use super::node::NodeId;
use crate::errors::{Result, StructuralError, UsageError};

/// Output representation of an exported matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixFormat {
    Dense,
    Sparse,
}

impl MatrixFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Sparse => "sparse",
        }
    }

    /// Parse format from string
    pub fn from_str(s: &str) -> std::result::Result<Self, UsageError> {
        match s.to_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            _ => Err(UsageError::UnknownMatrixFormat(s.to_string())),
        }
    }
}

impl Default for MatrixFormat {
    fn default() -> Self {
        Self::Dense
    }
}

impl fmt::Display for MatrixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric payload
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixData {
    Dense(Array2<f64>),
    /// Compressed sparse row
    Sparse(CsMat<f64>),
}

impl MatrixData {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MatrixData::Dense(a) => a.dim(),
            MatrixData::Sparse(m) => (m.rows(), m.cols()),
        }
    }

    pub fn format(&self) -> MatrixFormat {
        match self {
            MatrixData::Dense(_) => MatrixFormat::Dense,
            MatrixData::Sparse(_) => MatrixFormat::Sparse,
        }
    }
}

/// Matrix whose rows and columns are identified by node ids
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub data: MatrixData,
    pub row_ids: Vec<NodeId>,
    pub col_ids: Vec<NodeId>,
}

impl LabeledMatrix {
    pub fn new(data: MatrixData, row_ids: Vec<NodeId>, col_ids: Vec<NodeId>) -> Result<Self> {
        let (rows, cols) = data.shape();
        if rows != row_ids.len() || cols != col_ids.len() {
            return Err(StructuralError::DimensionMismatch {
                left: "matrix",
                right: "labels",
                detail: format!(
                    "payload is {}x{}, labels are {}x{}",
                    rows,
                    cols,
                    row_ids.len(),
                    col_ids.len()
                ),
            }
            .into());
        }
        Ok(Self {
            data,
            row_ids,
            col_ids,
        })
    }

    pub fn dense(data: Array2<f64>, row_ids: Vec<NodeId>, col_ids: Vec<NodeId>) -> Result<Self> {
        Self::new(MatrixData::Dense(data), row_ids, col_ids)
    }

    pub fn sparse(data: CsMat<f64>, row_ids: Vec<NodeId>, col_ids: Vec<NodeId>) -> Result<Self> {
        Self::new(MatrixData::Sparse(data), row_ids, col_ids)
    }

    /// Assemble from (row, col, value) triplets; duplicate positions are summed
    pub fn from_triplets(
        row_ids: Vec<NodeId>,
        col_ids: Vec<NodeId>,
        triplets: &[(usize, usize, f64)],
        format: MatrixFormat,
    ) -> Result<Self> {
        let shape = (row_ids.len(), col_ids.len());
        let data = match format {
            MatrixFormat::Dense => {
                let mut dense = Array2::<f64>::zeros(shape);
                for &(r, c, v) in triplets {
                    dense[[r, c]] += v;
                }
                MatrixData::Dense(dense)
            }
            MatrixFormat::Sparse => {
                let mut tri = TriMat::new(shape);
                for &(r, c, v) in triplets {
                    tri.add_triplet(r, c, v);
                }
                let csr: CsMat<f64> = tri.to_csr();
                MatrixData::Sparse(csr)
            }
        };
        Self::new(data, row_ids, col_ids)
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    #[inline]
    pub fn format(&self) -> MatrixFormat {
        self.data.format()
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        match &self.data {
            MatrixData::Dense(a) => a.iter().filter(|v| **v != 0.0).count(),
            MatrixData::Sparse(m) => m.iter().filter(|(v, _)| **v != 0.0).count(),
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        match &self.data {
            MatrixData::Dense(a) => a.clone(),
            MatrixData::Sparse(m) => m.to_dense(),
        }
    }

    /// Convert payload, keeping labels
    pub fn into_format(self, format: MatrixFormat) -> Self {
        if self.format() == format {
            return self;
        }
        let triplets = self.nonzero_entries();
        let (rows, cols) = self.shape();
        let data = match format {
            MatrixFormat::Dense => MatrixData::Dense(self.to_dense()),
            MatrixFormat::Sparse => {
                let mut tri = TriMat::new((rows, cols));
                for (r, c, v) in triplets {
                    tri.add_triplet(r, c, v);
                }
                MatrixData::Sparse(tri.to_csr())
            }
        };
        Self {
            data,
            row_ids: self.row_ids,
            col_ids: self.col_ids,
        }
    }

    /// Non-zero entries in row-major order
    pub fn nonzero_entries(&self) -> Vec<(usize, usize, f64)> {
        match &self.data {
            MatrixData::Dense(a) => a
                .indexed_iter()
                .filter(|(_, v)| **v != 0.0)
                .map(|((r, c), v)| (r, c, *v))
                .collect(),
            MatrixData::Sparse(m) => m
                .iter()
                .filter(|(v, _)| **v != 0.0)
                .map(|(v, (r, c))| (r, c, *v))
                .collect(),
        }
    }

    pub fn row_position(&self, id: &NodeId) -> Option<usize> {
        self.row_ids.iter().position(|r| r == id)
    }

    pub fn col_position(&self, id: &NodeId) -> Option<usize> {
        self.col_ids.iter().position(|c| c == id)
    }

    /// Entry by identity; `None` when either id is not a label
    pub fn get(&self, row: &NodeId, col: &NodeId) -> Option<f64> {
        let r = self.row_position(row)?;
        let c = self.col_position(col)?;
        Some(match &self.data {
            MatrixData::Dense(a) => a[[r, c]],
            MatrixData::Sparse(m) => m.get(r, c).copied().unwrap_or(0.0),
        })
    }
}

/// Vector whose entries are identified by node ids
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledVector {
    pub data: Array1<f64>,
    pub ids: Vec<NodeId>,
}

impl LabeledVector {
    pub fn new(data: Array1<f64>, ids: Vec<NodeId>) -> Result<Self> {
        if data.len() != ids.len() {
            return Err(StructuralError::DimensionMismatch {
                left: "vector",
                right: "labels",
                detail: format!("payload has {} entries, {} labels", data.len(), ids.len()),
            }
            .into());
        }
        Ok(Self { data, ids })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &NodeId) -> Option<f64> {
        self.ids.iter().position(|i| i == id).map(|p| self.data[p])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, f64)> + '_ {
        self.ids.iter().zip(self.data.iter().copied())
    }
}
