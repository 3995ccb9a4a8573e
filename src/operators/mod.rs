//! Topological and combinatorial operators of a graded domain.
//!
//! | operator       | maps             |
//! |----------------|------------------|
//! | `face(d, j)`   | `N[d] → N[d−1]`  |
//! | `delta(d)` (δ) | `N[d] → N[d−1]`  |
//! | `d(d)`         | `N[d] → N[d+1]`  |
//! | `zeta(d)` (ζ)  | `N[d] → N[d]`    |
//! | `mobius(d)` (μ)| `N[d] → N[d]`    |
//!
//! `δ∘δ = 0`, `d∘d = 0` and `μ∘ζ = ζ∘μ = I`. Every matrix is built once
//! per domain and degree and then shared.

pub mod cache;
mod face;
mod zeta;

use std::rc::Rc;

use crate::domain::{Field, GradedDomain};
use crate::error::Result;
use crate::id::Degree;
use crate::linear::LinearMap;

use cache::OperatorKind;

impl GradedDomain {
    fn endomorphism(
        self: &Rc<Self>,
        name: &'static str,
        source_degree: Degree,
        target_degree: Degree,
        matrix: Rc<nalgebra_sparse::CsrMatrix<f64>>,
    ) -> Result<LinearMap> {
        LinearMap::new(
            name,
            Rc::clone(self),
            source_degree,
            Rc::clone(self),
            target_degree,
            matrix,
        )
    }

    /// Face map deleting the `j`-th region of each degree-d chain.
    pub fn face(self: &Rc<Self>, degree: Degree, j: usize) -> Result<LinearMap> {
        let matrix = self.cache.get_or_build(OperatorKind::Face(j), degree, || {
            face::face_matrix(self, degree, j)
        })?;
        self.endomorphism("face", degree, degree - 1, matrix)
    }

    /// Boundary `δ_d = Σ_j (−1)^j face(d, j)`.
    pub fn delta(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        let matrix = self
            .cache
            .get_or_build(OperatorKind::Delta, degree, || face::delta_matrix(self, degree))?;
        self.endomorphism("delta", degree, degree - 1, matrix)
    }

    /// Coboundary `d_d = δ_{d+1}ᵀ`.
    pub fn d(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        Ok(self.delta(degree + 1)?.transpose().named("d"))
    }

    pub fn zeta(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        let matrix = self
            .cache
            .get_or_build(OperatorKind::Zeta, degree, || zeta::zeta_matrix(self, degree))?;
        self.endomorphism("zeta", degree, degree, matrix)
    }

    /// Möbius inverse of [`zeta`](Self::zeta).
    pub fn mobius(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        let zeta = self.zeta(degree)?;
        let cap = zeta::series_cap(self.nerve(), degree);
        let matrix = self.cache.get_or_build(OperatorKind::Mobius, degree, || {
            zeta::mobius_matrix(zeta.matrix(), degree, cap)
        })?;
        self.endomorphism("mobius", degree, degree, matrix)
    }

    /// Bethe counting numbers `c = μ_0ᵀ · 1`, a degree-0 field on the
    /// scalar domain. `Σ_{a ≥ b} c[a] = 1` for every region `b`.
    pub fn bethe(self: &Rc<Self>) -> Result<Field> {
        let scalars = self.scalars()?;
        let ones = scalars.ones(0)?;
        scalars.mobius(0)?.transpose().apply(&ones)
    }
}
