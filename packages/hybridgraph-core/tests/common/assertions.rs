//! Custom assertions for matrix and vector comparison

use approx::relative_eq;
use ndarray::{Array1, Array2};

/// Assert two dense matrices agree entry by entry
pub fn assert_matrix_close(actual: &Array2<f64>, expected: &Array2<f64>, epsilon: f64) {
    assert_eq!(actual.dim(), expected.dim(), "shape mismatch");
    for ((pos, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!(
            relative_eq!(*a, *e, epsilon = epsilon),
            "entry {:?}: expected {e}, got {a}",
            pos
        );
    }
}

/// Assert two vectors agree entry by entry
pub fn assert_vector_close(actual: &Array1<f64>, expected: &Array1<f64>, epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            relative_eq!(*a, *e, epsilon = epsilon),
            "entry {i}: expected {e}, got {a}"
        );
    }
}
