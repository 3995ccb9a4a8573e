//! Contiguous `(row, col, value)` buffers for sparse assembly.

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{NerveError, Result};

/// Three parallel buffers, converted once to CSR. Duplicate entries are
/// summed; entries that sum to zero are dropped.
#[derive(Clone, Debug, Default)]
pub struct Triplets {
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
}

impl Triplets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            cols: Vec::with_capacity(capacity),
            vals: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.vals.push(value);
    }

    /// Append every stored entry of `matrix`, scaled by `factor`.
    pub fn extend_scaled(&mut self, matrix: &CsrMatrix<f64>, factor: f64) {
        for (i, j, &v) in matrix.triplet_iter() {
            self.push(i, j, factor * v);
        }
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn into_csr(self, nrows: usize, ncols: usize) -> Result<CsrMatrix<f64>> {
        let coo = CooMatrix::try_from_triplets(nrows, ncols, self.rows, self.cols, self.vals)
            .map_err(|e| NerveError::SparseFormat(e.to_string()))?;
        prune(&CsrMatrix::from(&coo))
    }
}

/// Drop explicitly stored zeros.
pub fn prune(matrix: &CsrMatrix<f64>) -> Result<CsrMatrix<f64>> {
    if matrix.values().iter().all(|&v| v != 0.0) {
        return Ok(matrix.clone());
    }
    let mut offsets = Vec::with_capacity(matrix.nrows() + 1);
    let mut cols = Vec::with_capacity(matrix.nnz());
    let mut vals = Vec::with_capacity(matrix.nnz());
    offsets.push(0);
    for row in matrix.row_iter() {
        for (&j, &v) in row.col_indices().iter().zip(row.values()) {
            if v != 0.0 {
                cols.push(j);
                vals.push(v);
            }
        }
        offsets.push(cols.len());
    }
    CsrMatrix::try_from_csr_data(matrix.nrows(), matrix.ncols(), offsets, cols, vals)
        .map_err(|e| NerveError::SparseFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_summed() {
        let mut t = Triplets::new();
        t.push(0, 1, 1.0);
        t.push(0, 1, 2.0);
        t.push(1, 0, 4.0);
        let m = t.into_csr(2, 2).unwrap();
        assert_eq!(m.nnz(), 2);
        let entries: Vec<(usize, usize, f64)> =
            m.triplet_iter().map(|(i, j, &v)| (i, j, v)).collect();
        assert_eq!(entries, vec![(0, 1, 3.0), (1, 0, 4.0)]);
    }

    #[test]
    fn test_cancellations_are_dropped() {
        let mut t = Triplets::new();
        t.push(0, 0, 1.0);
        t.push(0, 0, -1.0);
        t.push(1, 1, 2.0);
        let m = t.into_csr(2, 2).unwrap();
        assert_eq!(m.nnz(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut t = Triplets::new();
        t.push(3, 0, 1.0);
        assert!(matches!(t.into_csr(2, 2), Err(NerveError::SparseFormat(_))));
    }
}
