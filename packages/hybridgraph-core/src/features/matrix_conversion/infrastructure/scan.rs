// Matrix Scan - row-parallel entry extraction
//
// Rows are scanned in parallel and reassembled in row order, so every result
// is identical to a sequential row-major scan.

use ndarray::Array2;
use rayon::prelude::*;

use crate::errors::{NumericError, Result};

/// Reject the first non-finite entry in row-major order (PARALLEL)
pub fn check_finite(role: &'static str, matrix: &Array2<f64>) -> Result<()> {
    let hit = (0..matrix.nrows()).into_par_iter().find_map_first(|r| {
        matrix
            .row(r)
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
            .map(|(c, v)| (r, c, *v))
    });

    match hit {
        Some((row, col, value)) => Err(NumericError::NonFinite {
            role,
            row,
            col,
            value,
        }
        .into()),
        None => Ok(()),
    }
}

/// Non-zero entries as (row, col, value), row-major (PARALLEL)
pub fn nonzero_entries(matrix: &Array2<f64>) -> Vec<(usize, usize, f64)> {
    let per_row: Vec<Vec<(usize, usize, f64)>> = (0..matrix.nrows())
        .into_par_iter()
        .map(|r| {
            matrix
                .row(r)
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(c, v)| (r, c, *v))
                .collect()
        })
        .collect();

    per_row.into_iter().flatten().collect()
}
