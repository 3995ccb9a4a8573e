//! Face maps and the (co)boundary.
//!
//! `face(d, j)` sends degree-d fields to degree-(d−1) fields along the
//! deletion of `a_j`. When `j < d` the tip is kept and fibers are copied.
//! When `j = d` the new tip `a_{d−1}` contains the old tip `a_d`, and the
//! fiber of `F(a_d)` is extended cylindrically to `F(a_{d−1})` through the
//! restriction `F(a_{d−1} → a_d)`.

use nalgebra_sparse::CsrMatrix;

use crate::domain::GradedDomain;
use crate::error::{NerveError, Result};
use crate::id::{tip, Degree};
use crate::linear::Triplets;

/// Push the entries of `sign · face(d, j)` into `triplets`.
fn push_face(
    domain: &GradedDomain,
    degree: Degree,
    j: usize,
    sign: f64,
    triplets: &mut Triplets,
) -> Result<()> {
    let nerve = domain.nerve();
    let source = domain.layout(degree)?;
    let target = domain.layout(degree - 1)?;

    let mut face = Vec::with_capacity(degree);
    for (c, chain) in nerve.level(degree)?.iter().enumerate() {
        face.clear();
        face.extend(chain.iter().enumerate().filter(|&(k, _)| k != j).map(|(_, &a)| a));
        let f = nerve.index_of(degree - 1, &face)?;
        let (col0, row0) = (source.begin()[c], target.begin()[f]);

        if j < degree {
            for x in 0..source.sizes()[c] {
                triplets.push(row0 + x, col0 + x, sign);
            }
        } else {
            let restriction = domain.restriction(tip(&face), tip(chain))?;
            for (x, &y) in restriction.iter().enumerate() {
                triplets.push(row0 + x, col0 + y, sign);
            }
        }
    }
    Ok(())
}

fn check_face(domain: &GradedDomain, degree: Degree, operator: &'static str) -> Result<()> {
    if degree == 0 || degree >= domain.depth() {
        return Err(NerveError::MissingDegree {
            operator,
            degree,
            available: domain.depth(),
        });
    }
    Ok(())
}

pub(crate) fn face_matrix(domain: &GradedDomain, degree: Degree, j: usize) -> Result<CsrMatrix<f64>> {
    check_face(domain, degree, "face")?;
    if j > degree {
        return Err(NerveError::IndexOutOfRange {
            index: j,
            size: degree + 1,
        });
    }
    let mut triplets = Triplets::with_capacity(domain.size(degree - 1)?);
    push_face(domain, degree, j, 1.0, &mut triplets)?;
    triplets.into_csr(domain.size(degree - 1)?, domain.size(degree)?)
}

/// `δ_d = Σ_j (−1)^j face(d, j)`, assembled in one buffer.
pub(crate) fn delta_matrix(domain: &GradedDomain, degree: Degree) -> Result<CsrMatrix<f64>> {
    check_face(domain, degree, "delta")?;
    let mut triplets = Triplets::with_capacity((degree + 1) * domain.size(degree - 1)?);
    for j in 0..=degree {
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        push_face(domain, degree, j, sign, &mut triplets)?;
    }
    triplets.into_csr(domain.size(degree - 1)?, domain.size(degree)?)
}
