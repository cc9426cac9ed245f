// Leontief Solver
//
// x = (I - A)^-1 f,  g = B x,  h = Q g
//
// Sparse payloads are densified for the LU factorization. Every operand
// pair is checked for label alignment before any arithmetic.
//
// A system is singular when its smallest LU pivot falls below
// PIVOT_TOLERANCE relative to its largest. Rounding leaves tiny non-zero
// pivots in exactly singular systems, so an exact-zero test is not enough.

use ahash::AHashMap;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::errors::{NumericError, Result, StructuralError, UsageError};
use crate::features::leontief::domain::{CategoryMatrix, Demand, InventorySplit};
use crate::shared::models::{LabeledMatrix, LabeledVector, MatrixData, NodeId};

/// Smallest accepted |U_ii| / max |U_ii|
pub const PIVOT_TOLERANCE: f64 = 1e-12;

// ============================================================
// Production
// ============================================================

/// Solve (I - A) x = f for one demand
pub fn production_vector(a: &LabeledMatrix, demand: &Demand) -> Result<LabeledVector> {
    let system = leontief_matrix(a)?;
    let f = demand_vector(&a.row_ids, demand)?;
    let n = system.nrows();

    let x = factorize(system)?
        .solve(&f)
        .ok_or(NumericError::SingularMatrix { dimension: n })?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(NumericError::SingularMatrix { dimension: n }.into());
    }

    debug!("Solved {}x{} Leontief system for {} demand entries", n, n, demand.len());
    LabeledVector::new(Array1::from_iter(x.iter().copied()), a.row_ids.clone())
}

/// Precomputed (I - A)^-1 for answering many demands
#[derive(Debug, Clone)]
pub struct LeontiefInverse {
    inverse: DMatrix<f64>,
    ids: Vec<NodeId>,
}

impl LeontiefInverse {
    pub fn new(a: &LabeledMatrix) -> Result<Self> {
        let system = leontief_matrix(a)?;
        let n = system.nrows();
        let inverse = factorize(system)?
            .try_inverse()
            .ok_or(NumericError::SingularMatrix { dimension: n })?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return Err(NumericError::SingularMatrix { dimension: n }.into());
        }
        debug!("Inverted {}x{} Leontief system", n, n);
        Ok(Self {
            inverse,
            ids: a.row_ids.clone(),
        })
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Total requirement of node `row` per unit demand of node `col`
    pub fn get(&self, row: &NodeId, col: &NodeId) -> Option<f64> {
        let r = self.ids.iter().position(|id| id == row)?;
        let c = self.ids.iter().position(|id| id == col)?;
        Some(self.inverse[(r, c)])
    }

    pub fn production_vector(&self, demand: &Demand) -> Result<LabeledVector> {
        let f = demand_vector(&self.ids, demand)?;
        let x = &self.inverse * f;
        LabeledVector::new(Array1::from_iter(x.iter().copied()), self.ids.clone())
    }
}

/// I - A as a dense nalgebra matrix
fn leontief_matrix(a: &LabeledMatrix) -> Result<DMatrix<f64>> {
    let (rows, cols) = a.shape();
    if rows != cols {
        return Err(StructuralError::DimensionMismatch {
            left: "production",
            right: "production",
            detail: format!("production matrix must be square, got {}x{}", rows, cols),
        }
        .into());
    }
    if a.row_ids != a.col_ids {
        return Err(StructuralError::LabelMismatch {
            left: "production rows",
            right: "production columns",
        }
        .into());
    }

    let dense = a.to_dense();
    if let Some(((row, col), value)) = dense.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(NumericError::NonFinite {
            role: "production",
            row,
            col,
            value: *value,
        }
        .into());
    }
    Ok(DMatrix::from_fn(rows, cols, |i, j| {
        let identity = if i == j { 1.0 } else { 0.0 };
        identity - dense[[i, j]]
    }))
}

/// LU of (I - A), rejected when a pivot is negligible
fn factorize(system: DMatrix<f64>) -> Result<LU<f64, Dyn, Dyn>> {
    let n = system.nrows();
    let lu = system.lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    let largest = pivots.max();
    let smallest = pivots.min();
    if n > 0 && !(largest > 0.0 && smallest > PIVOT_TOLERANCE * largest) {
        debug!(
            "Rejected {}x{} Leontief system: pivot ratio {:e}",
            n,
            n,
            smallest / largest
        );
        return Err(NumericError::SingularMatrix { dimension: n }.into());
    }
    Ok(lu)
}

fn demand_vector(ids: &[NodeId], demand: &Demand) -> Result<DVector<f64>> {
    let positions: AHashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut f = DVector::zeros(ids.len());
    for (id, amount) in demand.entries() {
        let index = positions.get(id).ok_or(UsageError::UnknownDemandNode(*id))?;
        if !amount.is_finite() {
            return Err(NumericError::NonFinite {
                role: "demand",
                row: *index,
                col: 0,
                value: *amount,
            }
            .into());
        }
        f[*index] = *amount;
    }
    Ok(f)
}

// ============================================================
// Inventory & Impact
// ============================================================

/// g = B x
pub fn inventory_vector(x: &LabeledVector, b: &LabeledMatrix) -> Result<LabeledVector> {
    if b.col_ids != x.ids {
        return Err(StructuralError::LabelMismatch {
            left: "extension matrix columns",
            right: "production vector",
        }
        .into());
    }
    LabeledVector::new(mat_vec(b, &x.data), b.row_ids.clone())
}

/// h = Q g
pub fn impact_vector(g: &LabeledVector, q: &LabeledMatrix) -> Result<LabeledVector> {
    if q.col_ids != g.ids {
        return Err(StructuralError::LabelMismatch {
            left: "indicator matrix columns",
            right: "inventory vector",
        }
        .into());
    }
    LabeledVector::new(mat_vec(q, &g.data), q.row_ids.clone())
}

/// Inventory per category: G = B X, X[n, c] = x[n] if node n is in category c
pub fn inventory_matrix(x: &LabeledVector, split: &InventorySplit, b: &LabeledMatrix) -> Result<CategoryMatrix> {
    if b.col_ids != x.ids {
        return Err(StructuralError::LabelMismatch {
            left: "extension matrix columns",
            right: "production vector",
        }
        .into());
    }

    let positions: AHashMap<NodeId, usize> = x.ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut split_x = Array2::<f64>::zeros((x.len(), split.len()));
    for (c, (category, ids)) in split.categories().iter().enumerate() {
        for id in ids {
            let n = positions.get(id).ok_or_else(|| UsageError::UnknownSplitNode {
                category: category.clone(),
                id: *id,
            })?;
            split_x[[*n, c]] = x.data[*n];
        }
    }

    let g = b.to_dense().dot(&split_x);
    CategoryMatrix::new(g, b.row_ids.clone(), split.names())
}

/// Impact per category: H = Q G
pub fn impact_matrix(g: &CategoryMatrix, q: &LabeledMatrix) -> Result<CategoryMatrix> {
    if q.col_ids != g.row_ids {
        return Err(StructuralError::LabelMismatch {
            left: "indicator matrix columns",
            right: "inventory matrix rows",
        }
        .into());
    }
    let h = q.to_dense().dot(&g.data);
    CategoryMatrix::new(h, q.row_ids.clone(), g.categories.clone())
}

fn mat_vec(m: &LabeledMatrix, v: &Array1<f64>) -> Array1<f64> {
    match &m.data {
        MatrixData::Dense(a) => a.dot(v),
        MatrixData::Sparse(s) => {
            let mut out = Array1::<f64>::zeros(s.rows());
            for (value, (row, col)) in s.iter() {
                out[row] += value * v[col];
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HybridGraphError;
    use crate::shared::models::MatrixFormat;
    use approx::assert_relative_eq;
    use ndarray::array;
    use uuid::Uuid;

    fn ids(n: usize, offset: u128) -> Vec<NodeId> {
        (0..n)
            .map(|i| NodeId::from_uuid(Uuid::from_u128(offset + i as u128)))
            .collect()
    }

    fn a_matrix() -> LabeledMatrix {
        let p = ids(2, 0);
        LabeledMatrix::dense(array![[0.0, 0.5], [0.2, 0.0]], p.clone(), p).unwrap()
    }

    #[test]
    fn test_production_vector_two_nodes() {
        let a = a_matrix();
        // (I - A)^-1 = 1/0.9 * [[1, 0.5], [0.2, 1]]
        let x = production_vector(&a, &Demand::single(a.row_ids[0], 9.0)).unwrap();
        assert_relative_eq!(x.data[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(x.data[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_matches_direct_solve() {
        let a = a_matrix().into_format(MatrixFormat::Sparse);
        let inverse = LeontiefInverse::new(&a).unwrap();
        let demand = Demand::new().with(a.row_ids[1], 4.5);
        let direct = production_vector(&a, &demand).unwrap();
        let reused = inverse.production_vector(&demand).unwrap();
        for (d, r) in direct.data.iter().zip(reused.data.iter()) {
            assert_relative_eq!(*d, *r, epsilon = 1e-12);
        }
        assert_relative_eq!(
            inverse.get(&a.row_ids[0], &a.row_ids[1]).unwrap(),
            0.5 / 0.9,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_singular_system() {
        let p = ids(1, 0);
        let a = LabeledMatrix::dense(array![[1.0]], p.clone(), p.clone()).unwrap();
        let err = production_vector(&a, &Demand::single(p[0], 1.0)).unwrap_err();
        assert!(matches!(
            err,
            HybridGraphError::Numeric(NumericError::SingularMatrix { dimension: 1 })
        ));
        assert!(LeontiefInverse::new(&a).unwrap_err().is_numeric());
    }

    #[test]
    fn test_columns_summing_to_one_are_singular() {
        // every column of A sums to 1, so 1^T (I - A) = 0 and rounding leaves a tiny pivot
        let cases = [
            array![[0.7, 0.3], [0.3, 0.7]],
            array![[0.9, 0.1], [0.1, 0.9]],
            Array2::from_elem((3, 3), 1.0 / 3.0),
        ];
        for data in cases {
            let n = data.nrows();
            let p = ids(n, 0);
            let a = LabeledMatrix::dense(data, p.clone(), p.clone()).unwrap();
            let err = production_vector(&a, &Demand::single(p[0], 1.0)).unwrap_err();
            assert!(matches!(
                err,
                HybridGraphError::Numeric(NumericError::SingularMatrix { dimension }) if dimension == n
            ));
            assert!(matches!(
                LeontiefInverse::new(&a).unwrap_err(),
                HybridGraphError::Numeric(NumericError::SingularMatrix { .. })
            ));
        }
    }

    #[test]
    fn test_non_finite_input_is_not_singular() {
        let a = a_matrix();
        let err = production_vector(&a, &Demand::single(a.row_ids[1], f64::NAN)).unwrap_err();
        assert!(matches!(
            err,
            HybridGraphError::Numeric(NumericError::NonFinite { role: "demand", row: 1, .. })
        ));

        let inverse = LeontiefInverse::new(&a).unwrap();
        assert!(matches!(
            inverse.production_vector(&Demand::single(a.row_ids[0], f64::INFINITY)).unwrap_err(),
            HybridGraphError::Numeric(NumericError::NonFinite { role: "demand", .. })
        ));

        let p = ids(2, 0);
        let bad = LabeledMatrix::dense(array![[0.0, f64::INFINITY], [0.2, 0.0]], p.clone(), p.clone()).unwrap();
        let err = production_vector(&bad, &Demand::single(p[0], 1.0)).unwrap_err();
        assert!(matches!(
            err,
            HybridGraphError::Numeric(NumericError::NonFinite {
                role: "production",
                row: 0,
                col: 1,
                ..
            })
        ));
        assert!(matches!(
            LeontiefInverse::new(&bad).unwrap_err(),
            HybridGraphError::Numeric(NumericError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_non_square_is_structural() {
        let a = LabeledMatrix::dense(array![[0.0, 0.1]], ids(1, 0), ids(2, 0)).unwrap();
        assert!(production_vector(&a, &Demand::new()).unwrap_err().is_structural());
    }

    #[test]
    fn test_unknown_demand_node() {
        let a = a_matrix();
        let stranger = ids(1, 99)[0];
        let err = production_vector(&a, &Demand::single(stranger, 1.0)).unwrap_err();
        assert!(matches!(err, HybridGraphError::Usage(UsageError::UnknownDemandNode(id)) if id == stranger));
    }

    #[test]
    fn test_inventory_and_impact_alignment() {
        let a = a_matrix();
        let x = production_vector(&a, &Demand::single(a.row_ids[0], 9.0)).unwrap();
        let e = ids(1, 10);
        let b = LabeledMatrix::dense(array![[1.0, 3.0]], e.clone(), a.row_ids.clone()).unwrap();
        let g = inventory_vector(&x, &b).unwrap();
        assert_relative_eq!(g.data[0], 16.0, epsilon = 1e-12);

        let q = LabeledMatrix::dense(array![[2.0]], ids(1, 20), e).unwrap();
        let h = impact_vector(&g, &q).unwrap();
        assert_relative_eq!(h.data[0], 32.0, epsilon = 1e-12);

        // B columns in a different order than x
        let reversed: Vec<NodeId> = a.row_ids.iter().rev().copied().collect();
        let misaligned = LabeledMatrix::dense(array![[1.0, 3.0]], ids(1, 10), reversed).unwrap();
        assert!(matches!(
            inventory_vector(&x, &misaligned).unwrap_err(),
            HybridGraphError::Structural(StructuralError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn test_inventory_matrix_partitions_vector() {
        let a = a_matrix();
        let x = production_vector(&a, &Demand::single(a.row_ids[0], 9.0)).unwrap();
        let b = LabeledMatrix::dense(array![[1.0, 3.0], [0.5, 0.0]], ids(2, 10), a.row_ids.clone()).unwrap();
        let split = InventorySplit::new()
            .category("first", vec![a.row_ids[0]])
            .category("second", vec![a.row_ids[1]]);

        let g_split = inventory_matrix(&x, &split, &b).unwrap();
        let g = inventory_vector(&x, &b).unwrap();
        assert_eq!(g_split.categories, vec!["first".to_string(), "second".to_string()]);
        for (total, expected) in g_split.row_sums().data.iter().zip(g.data.iter()) {
            assert_relative_eq!(*total, *expected, epsilon = 1e-12);
        }
        assert_relative_eq!(g_split.data[[0, 1]], 6.0, epsilon = 1e-12);

        let q = LabeledMatrix::dense(array![[1.0, 2.0]], ids(1, 20), ids(2, 10)).unwrap();
        let h_split = impact_matrix(&g_split, &q).unwrap();
        assert_relative_eq!(h_split.data[[0, 0]], 20.0, epsilon = 1e-12);

        let bad = InventorySplit::new().category("x", ids(1, 50));
        assert!(inventory_matrix(&x, &bad, &b).unwrap_err().is_usage());
    }
}
