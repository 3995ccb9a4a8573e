//! Write-once memo table for operator matrices.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use nalgebra_sparse::CsrMatrix;
use tracing::trace;

use crate::error::Result;
use crate::id::Degree;

/// Which operator a cached matrix belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `face(d, j)`
    Face(usize),
    Delta,
    Zeta,
    Mobius,
    ToScalars,
    Means,
}

/// Matrices keyed by `(kind, degree)`. Each entry is computed at most once;
/// the table is never borrowed while an entry is being built, so builders
/// may consult the cache for other entries.
#[derive(Debug, Default)]
pub struct OperatorCache {
    matrices: RefCell<HashMap<(OperatorKind, Degree), Rc<CsrMatrix<f64>>>>,
}

impl OperatorCache {
    pub fn get(&self, kind: OperatorKind, degree: Degree) -> Option<Rc<CsrMatrix<f64>>> {
        self.matrices.borrow().get(&(kind, degree)).cloned()
    }

    pub fn get_or_build(
        &self,
        kind: OperatorKind,
        degree: Degree,
        build: impl FnOnce() -> Result<CsrMatrix<f64>>,
    ) -> Result<Rc<CsrMatrix<f64>>> {
        if let Some(matrix) = self.get(kind, degree) {
            return Ok(matrix);
        }
        let matrix = Rc::new(build()?);
        trace!(
            ?kind,
            degree,
            rows = matrix.nrows(),
            cols = matrix.ncols(),
            nnz = matrix.nnz(),
            "built operator"
        );
        Ok(Rc::clone(
            self.matrices
                .borrow_mut()
                .entry((kind, degree))
                .or_insert(matrix),
        ))
    }

    pub fn len(&self) -> usize {
        self.matrices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.borrow().is_empty()
    }
}
