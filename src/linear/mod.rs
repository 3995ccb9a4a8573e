//! Sparse linear maps between graded domains.
//!
//! A [`LinearMap`] sends degree `s` fields of its source domain to degree
//! `t` fields of its target domain. The matrix has shape
//! `[size(target[t]), size(source[s])]` and is shared, so cloning a map or
//! reading it back from the operator cache never copies coefficients.
//!
//! `apply` and `compose` are the primitive operations; the arithmetic
//! operators are thin wrappers returning `Result` where operands may
//! disagree.

mod triplets;

pub use triplets::{prune, Triplets};

use std::fmt;
use std::ops::{Div, Mul, Neg};
use std::rc::Rc;

use nalgebra::{Complex, DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use crate::domain::{Field, GradedDomain};
use crate::error::{NerveError, Result};
use crate::id::Degree;

#[derive(Clone)]
pub struct LinearMap {
    name: &'static str,
    source: Rc<GradedDomain>,
    source_degree: Degree,
    target: Rc<GradedDomain>,
    target_degree: Degree,
    matrix: Rc<CsrMatrix<f64>>,
}

impl fmt::Debug for LinearMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearMap")
            .field("name", &self.name)
            .field("source_degree", &self.source_degree)
            .field("target_degree", &self.target_degree)
            .field("shape", &self.shape())
            .field("nnz", &self.matrix.nnz())
            .finish()
    }
}

impl LinearMap {
    pub fn new(
        name: &'static str,
        source: Rc<GradedDomain>,
        source_degree: Degree,
        target: Rc<GradedDomain>,
        target_degree: Degree,
        matrix: Rc<CsrMatrix<f64>>,
    ) -> Result<Self> {
        let rows = target.size(target_degree)?;
        if matrix.nrows() != rows {
            return Err(NerveError::ShapeMismatch {
                operator: name,
                degree: target_degree,
                expected: rows,
                found: matrix.nrows(),
            });
        }
        let cols = source.size(source_degree)?;
        if matrix.ncols() != cols {
            return Err(NerveError::ShapeMismatch {
                operator: name,
                degree: source_degree,
                expected: cols,
                found: matrix.ncols(),
            });
        }
        Ok(Self {
            name,
            source,
            source_degree,
            target,
            target_degree,
            matrix,
        })
    }

    pub fn from_triplets(
        name: &'static str,
        source: Rc<GradedDomain>,
        source_degree: Degree,
        target: Rc<GradedDomain>,
        target_degree: Degree,
        triplets: Triplets,
    ) -> Result<Self> {
        let matrix = triplets.into_csr(target.size(target_degree)?, source.size(source_degree)?)?;
        Self::new(
            name,
            source,
            source_degree,
            target,
            target_degree,
            Rc::new(matrix),
        )
    }

    pub fn identity(domain: &Rc<GradedDomain>, degree: Degree) -> Result<Self> {
        let n = domain.size(degree)?;
        let mut triplets = Triplets::with_capacity(n);
        for i in 0..n {
            triplets.push(i, i, 1.0);
        }
        Self::from_triplets(
            "identity",
            Rc::clone(domain),
            degree,
            Rc::clone(domain),
            degree,
            triplets,
        )
    }

    /// Same map under another name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn source(&self) -> &Rc<GradedDomain> {
        &self.source
    }

    pub fn target(&self) -> &Rc<GradedDomain> {
        &self.target
    }

    pub fn source_degree(&self) -> Degree {
        self.source_degree
    }

    pub fn target_degree(&self) -> Degree {
        self.target_degree
    }

    /// `target_degree − source_degree`
    pub fn shift(&self) -> isize {
        self.target_degree as isize - self.source_degree as isize
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.matrix.nrows(), self.matrix.ncols())
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    // ========================================================================
    // APPLICATION
    // ========================================================================

    pub fn apply(&self, field: &Field) -> Result<Field> {
        if field.degree() != self.source_degree || !field.domain().same_layout(&self.source) {
            return Err(NerveError::DomainMismatch {
                operator: self.name,
            });
        }
        let data = &*self.matrix * field.data();
        Ok(Field::from_parts(
            Rc::clone(&self.target),
            self.target_degree,
            data,
        ))
    }

    /// Apply to a raw coefficient vector.
    pub fn apply_vec(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        self.check_len(x.len())?;
        Ok(&*self.matrix * x)
    }

    /// Apply the real matrix to complex coefficients.
    pub fn apply_complex(&self, x: &DVector<Complex<f64>>) -> Result<DVector<Complex<f64>>> {
        self.check_len(x.len())?;
        Ok(spmv_complex(&self.matrix, x))
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len == self.matrix.ncols() {
            Ok(())
        } else {
            Err(NerveError::ShapeMismatch {
                operator: self.name,
                degree: self.source_degree,
                expected: self.matrix.ncols(),
                found: len,
            })
        }
    }

    // ========================================================================
    // ALGEBRA
    // ========================================================================

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &LinearMap) -> Result<LinearMap> {
        if other.target_degree != self.source_degree || !other.target.same_layout(&self.source) {
            return Err(NerveError::DomainMismatch {
                operator: "compose",
            });
        }
        let product = prune(&(&*self.matrix * &*other.matrix))?;
        Ok(LinearMap {
            name: "compose",
            source: Rc::clone(&other.source),
            source_degree: other.source_degree,
            target: Rc::clone(&self.target),
            target_degree: self.target_degree,
            matrix: Rc::new(product),
        })
    }

    pub fn transpose(&self) -> LinearMap {
        LinearMap {
            name: self.name,
            source: Rc::clone(&self.target),
            source_degree: self.target_degree,
            target: Rc::clone(&self.source),
            target_degree: self.source_degree,
            matrix: Rc::new(self.matrix.transpose()),
        }
    }

    pub fn scale(&self, factor: f64) -> LinearMap {
        self.map_values(|_, _, v| factor * v)
    }

    fn like(&self, other: &LinearMap) -> bool {
        self.source_degree == other.source_degree
            && self.target_degree == other.target_degree
            && self.source.same_layout(&other.source)
            && self.target.same_layout(&other.target)
    }

    fn combine(&self, other: &LinearMap, factor: f64, operator: &'static str) -> Result<LinearMap> {
        if !self.like(other) {
            return Err(NerveError::DomainMismatch { operator });
        }
        let mut triplets = Triplets::with_capacity(self.nnz() + other.nnz());
        triplets.extend_scaled(&self.matrix, 1.0);
        triplets.extend_scaled(&other.matrix, factor);
        let (rows, cols) = self.shape();
        Ok(LinearMap {
            name: operator,
            matrix: Rc::new(triplets.into_csr(rows, cols)?),
            ..self.clone()
        })
    }

    pub fn try_add(&self, other: &LinearMap) -> Result<LinearMap> {
        self.combine(other, 1.0, "add")
    }

    pub fn try_sub(&self, other: &LinearMap) -> Result<LinearMap> {
        self.combine(other, -1.0, "sub")
    }

    /// `diag(w) · M` for a field `w` on the target.
    pub fn weight_target(&self, weights: &Field) -> Result<LinearMap> {
        if weights.degree() != self.target_degree || !weights.domain().same_layout(&self.target) {
            return Err(NerveError::DomainMismatch {
                operator: "weight_target",
            });
        }
        let w = weights.data();
        Ok(self.map_values(|i, _, v| w[i] * v))
    }

    /// `M · diag(w)` for a field `w` on the source.
    pub fn weight_source(&self, weights: &Field) -> Result<LinearMap> {
        if weights.degree() != self.source_degree || !weights.domain().same_layout(&self.source) {
            return Err(NerveError::DomainMismatch {
                operator: "weight_source",
            });
        }
        let w = weights.data();
        Ok(self.map_values(|_, j, v| v * w[j]))
    }

    /// Rebuild the matrix with `f(row, col, value)` on every stored entry.
    fn map_values(&self, f: impl Fn(usize, usize, f64) -> f64) -> LinearMap {
        let offsets = self.matrix.row_offsets();
        let cols = self.matrix.col_indices();
        let mut matrix = CsrMatrix::clone(&self.matrix);
        let values = matrix.values_mut();
        for i in 0..offsets.len() - 1 {
            for k in offsets[i]..offsets[i + 1] {
                values[k] = f(i, cols[k], values[k]);
            }
        }
        LinearMap {
            matrix: Rc::new(matrix),
            ..self.clone()
        }
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.matrix.nrows(), self.matrix.ncols());
        for (i, j, &v) in self.matrix.triplet_iter() {
            dense[(i, j)] += v;
        }
        dense
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.matrix.values().iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Largest absolute coefficient.
    pub fn max_abs(&self) -> f64 {
        self.matrix.values().iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

/// `y = M x` with a real matrix and complex `x`; the sparse backend only
/// multiplies operands of one scalar type.
fn spmv_complex(matrix: &CsrMatrix<f64>, x: &DVector<Complex<f64>>) -> DVector<Complex<f64>> {
    DVector::from_iterator(
        matrix.nrows(),
        matrix.row_iter().map(|row| {
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&j, &w)| x[j] * w)
                .sum::<Complex<f64>>()
        }),
    )
}

// ============================================================================
// OPERATOR SUGAR
// ============================================================================

impl Mul<&Field> for &LinearMap {
    type Output = Result<Field>;

    fn mul(self, rhs: &Field) -> Result<Field> {
        self.apply(rhs)
    }
}

impl Mul<&LinearMap> for &LinearMap {
    type Output = Result<LinearMap>;

    fn mul(self, rhs: &LinearMap) -> Result<LinearMap> {
        self.compose(rhs)
    }
}

impl Mul<f64> for &LinearMap {
    type Output = LinearMap;

    fn mul(self, rhs: f64) -> LinearMap {
        self.scale(rhs)
    }
}

impl Div<f64> for &LinearMap {
    type Output = LinearMap;

    fn div(self, rhs: f64) -> LinearMap {
        self.scale(1.0 / rhs)
    }
}

impl Neg for &LinearMap {
    type Output = LinearMap;

    fn neg(self) -> LinearMap {
        self.scale(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NerveConfig;
    use crate::functor::Functor;
    use crate::hypergraph::Hypergraph;
    use std::sync::Arc;

    fn path(functor: Functor) -> Rc<GradedDomain> {
        // {0,1} > {0}, {0,1} > {1}
        let nerve = Hypergraph::new(vec![vec![0, 1], vec![0], vec![1]])
            .nerve(&NerveConfig::default())
            .unwrap();
        GradedDomain::new(Arc::new(nerve), functor).unwrap()
    }

    fn diag(dom: &Rc<GradedDomain>, values: &[f64]) -> LinearMap {
        let mut t = Triplets::new();
        for (i, &v) in values.iter().enumerate() {
            t.push(i, i, v);
        }
        LinearMap::from_triplets("diag", Rc::clone(dom), 0, Rc::clone(dom), 0, t).unwrap()
    }

    #[test]
    fn test_identity_applies() {
        let dom = path(Functor::Trivial);
        let id = LinearMap::identity(&dom, 0).unwrap();
        let f = dom.range(0).unwrap();
        assert_eq!(id.apply(&f).unwrap().data(), f.data());
        assert_eq!(id.shift(), 0);
    }

    #[test]
    fn test_compose_and_sugar() {
        let dom = path(Functor::Trivial);
        let a = diag(&dom, &[1.0, 2.0, 3.0]);
        let b = diag(&dom, &[2.0, 0.5, -1.0]);
        let ab = (&a * &b).unwrap();
        assert_eq!(
            ab.to_dense(),
            DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 1.0, -3.0]))
        );
        let f = dom.ones(0).unwrap();
        let g = (&ab * &f).unwrap();
        assert_eq!(g.data().as_slice(), &[2.0, 1.0, -3.0]);
        assert_eq!((&a / 2.0).to_dense()[(1, 1)], 1.0);
        assert_eq!((-&a).to_dense()[(2, 2)], -3.0);
    }

    #[test]
    fn test_add_and_sub_drop_cancellations() {
        let dom = path(Functor::Trivial);
        let a = diag(&dom, &[1.0, 2.0, 3.0]);
        let zero = a.try_sub(&a).unwrap();
        assert_eq!(zero.nnz(), 0);
        let twice = a.try_add(&a).unwrap();
        assert!((twice.norm() - 2.0 * a.norm()).abs() < 1e-12);
    }

    #[test]
    fn test_weights() {
        let dom = path(Functor::Trivial);
        let id = LinearMap::identity(&dom, 0).unwrap();
        let w = dom.range(0).unwrap();
        let left = id.weight_target(&w).unwrap();
        let right = id.weight_source(&w).unwrap();
        assert_eq!(left.to_dense(), right.to_dense());
        assert_eq!(left.to_dense()[(2, 2)], 2.0);
    }

    #[test]
    fn test_transpose_swaps_degrees() {
        let dom = path(Functor::ising());
        let sums = dom.to_scalars(0).unwrap();
        assert_eq!(sums.shape(), (3, 8));
        let t = sums.transpose();
        assert_eq!(t.shape(), (8, 3));
        assert_eq!(t.source_degree(), 0);
        assert!(t.source().functor().is_trivial());
    }

    #[test]
    fn test_apply_complex() {
        let dom = path(Functor::Trivial);
        let a = diag(&dom, &[1.0, 2.0, 3.0]);
        let x = DVector::from_vec(vec![
            Complex::new(1.0, 1.0),
            Complex::new(0.0, 1.0),
            Complex::new(2.0, 0.0),
        ]);
        let y = a.apply_complex(&x).unwrap();
        assert_eq!(y[1], Complex::new(0.0, 2.0));
        assert_eq!(y[2], Complex::new(6.0, 0.0));
        assert!(a.apply_complex(&DVector::from_vec(vec![Complex::new(0.0, 0.0)])).is_err());
    }

    #[test]
    fn test_sparse_and_dense_products_agree() {
        let dom = path(Functor::ising());
        let d0 = dom.d(0).unwrap();
        let x = dom.range(0).unwrap();
        let sparse = d0.apply(&x).unwrap();
        let dense = d0.to_dense() * x.data();
        assert!((sparse.data() - &dense).norm() < 1e-12);
        assert_eq!(&d0.apply_vec(x.data()).unwrap(), sparse.data());

        let z = x.data().map(|v| Complex::new(v, -2.0 * v));
        let w = d0.apply_complex(&z).unwrap();
        for (k, c) in w.iter().enumerate() {
            assert!((c.re - dense[k]).abs() < 1e-12);
            assert!((c.im + 2.0 * dense[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mismatched_shapes() {
        let dom = path(Functor::Trivial);
        let sums = path(Functor::Trivial).to_scalars(0).unwrap();
        let f = dom.ones(0).unwrap();
        // another nerve
        assert!(matches!(
            sums.apply(&f),
            Err(NerveError::DomainMismatch { .. })
        ));
    }
}
