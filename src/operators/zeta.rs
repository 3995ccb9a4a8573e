//! Zeta transforms and Möbius inversion.
//!
//! `ζ_d` sums over degree-d diagrams: pairs of chains `(α, β)` with
//! `β_k ≤ α_k` for every `k` and `β_{k−1} ⊄ α_k` for `k ≥ 1`. Each pair
//! contributes the restriction `F(tip α → tip β)`: a `1` at row `(α, x)`,
//! column `(β, F(tip α → tip β)(x))`.
//!
//! The diagonal pairs `(α, α)` contribute the identity, and the remaining
//! pairs form a strict order, so `X = ζ − I` is nilpotent on acyclic
//! posets and `μ = Σ_k (−X)^k` is a finite sum.

use std::collections::HashMap;

use nalgebra_sparse::CsrMatrix;
use tracing::trace;

use crate::domain::GradedDomain;
use crate::error::{NerveError, Result};
use crate::id::{tip, ChainId, Degree};
use crate::linear::{prune, Triplets};
use crate::nerve::Nerve;

/// Degree-d diagrams, grouped by their first chain.
pub(crate) fn diagrams(nerve: &Nerve, degree: Degree) -> Result<HashMap<ChainId, Vec<ChainId>>> {
    let poset = nerve.poset();
    let mut pairs: HashMap<ChainId, Vec<ChainId>> = HashMap::new();
    for a in 0..poset.len() {
        let below = pairs.entry(a).or_default();
        below.push(a);
        below.extend(poset.below(a).iter().map(|b| b as usize));
    }

    for k in 0..degree {
        let mut next: HashMap<ChainId, Vec<ChainId>> = HashMap::new();
        let (level, longer) = (nerve.level(k)?, nerve.level(k + 1)?);
        for (alpha_id, alpha) in longer.iter().enumerate() {
            let head = nerve.index_of(k, &alpha[..=k])?;
            let a = tip(alpha);
            let Some(betas) = pairs.get(&head) else {
                continue;
            };
            let row = next.entry(alpha_id).or_default();
            for &beta_id in betas {
                let beta = &level[beta_id];
                let b = tip(beta);
                if poset.le(b, a) {
                    continue;
                }
                for b2 in poset.below(b) {
                    let b2 = b2 as usize;
                    if !poset.le(b2, a) {
                        continue;
                    }
                    let mut extended = beta.clone();
                    extended.push(b2);
                    row.push(nerve.index_of(k + 1, &extended)?);
                }
            }
        }
        pairs = next;
    }
    Ok(pairs)
}

pub(crate) fn zeta_matrix(domain: &GradedDomain, degree: Degree) -> Result<CsrMatrix<f64>> {
    let nerve = domain.nerve();
    let layout = domain.layout(degree)?;
    let level = nerve.level(degree)?;
    let pairs = diagrams(nerve, degree)?;

    let mut triplets = Triplets::with_capacity(layout.total());
    let mut count = 0;
    for (&alpha, betas) in &pairs {
        let a = tip(&level[alpha]);
        let row0 = layout.begin()[alpha];
        for &beta in betas {
            let b = tip(&level[beta]);
            let col0 = layout.begin()[beta];
            let restriction = domain.restriction(a, b)?;
            for (x, &y) in restriction.iter().enumerate() {
                triplets.push(row0 + x, col0 + y, 1.0);
            }
            count += 1;
        }
    }
    trace!(degree, diagrams = count, "zeta diagrams");
    triplets.into_csr(layout.total(), layout.total())
}

/// Upper bound on the number of Neumann terms before `(−X)^k` vanishes.
pub(crate) fn series_cap(nerve: &Nerve, degree: Degree) -> usize {
    let height = nerve.poset().height().unwrap_or(nerve.poset().len());
    (degree + 1) * (height + 1) + 1
}

/// `μ = ζ^{-1} = Σ_{k ≥ 0} (−X)^k` with `X = ζ − I`.
pub(crate) fn mobius_matrix(
    zeta: &CsrMatrix<f64>,
    degree: Degree,
    cap: usize,
) -> Result<CsrMatrix<f64>> {
    let n = zeta.nrows();
    let mut identity = Triplets::with_capacity(n);
    for i in 0..n {
        identity.push(i, i, 1.0);
    }
    let identity = identity.into_csr(n, n)?;

    let mut minus_x = Triplets::with_capacity(zeta.nnz() + n);
    minus_x.extend_scaled(zeta, -1.0);
    minus_x.extend_scaled(&identity, 1.0);
    let minus_x = minus_x.into_csr(n, n)?;

    let mut total = Triplets::with_capacity(zeta.nnz());
    total.extend_scaled(&identity, 1.0);
    let mut power = identity;
    for terms in 1..=cap {
        power = prune(&(&power * &minus_x))?;
        if power.nnz() == 0 {
            trace!(degree, terms, "mobius series vanished");
            return total.into_csr(n, n);
        }
        total.extend_scaled(&power, 1.0);
    }
    Err(NerveError::DegenerateOperator {
        operator: "mobius",
        degree,
        terms: cap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NerveConfig;
    use crate::hypergraph::Hypergraph;

    fn path3() -> Nerve {
        // {0,1,2} > {0,1} > {0}
        Hypergraph::new(vec![vec![0, 1, 2], vec![0, 1], vec![0]])
            .nerve(&NerveConfig::default())
            .unwrap()
    }

    #[test]
    fn test_degree_zero_diagrams_are_the_order() {
        let nerve = path3();
        let pairs = diagrams(&nerve, 0).unwrap();
        let mut top = pairs[&0].clone();
        top.sort();
        assert_eq!(top, vec![0, 1, 2]);
        assert_eq!(pairs[&2], vec![2]);
    }

    #[test]
    fn test_degree_one_diagrams() {
        let nerve = path3();
        let pairs = diagrams(&nerve, 1).unwrap();
        let chain = |c: &[usize]| nerve.index_of(1, c).unwrap();
        let mut from_01 = pairs[&chain(&[0, 1])].clone();
        from_01.sort();
        let mut expected = vec![chain(&[0, 1]), chain(&[0, 2])];
        expected.sort();
        assert_eq!(from_01, expected);
        let mut from_02 = pairs[&chain(&[0, 2])].clone();
        from_02.sort();
        let mut expected = vec![chain(&[0, 2]), chain(&[1, 2])];
        expected.sort();
        assert_eq!(from_02, expected);
        assert_eq!(pairs[&chain(&[1, 2])], vec![chain(&[1, 2])]);
    }

    #[test]
    fn test_series_cap() {
        let nerve = path3();
        assert_eq!(series_cap(&nerve, 0), 4);
        assert_eq!(series_cap(&nerve, 1), 7);
    }

    #[test]
    fn test_mobius_of_cyclic_zeta_is_degenerate() {
        // 1 on the diagonal and a 2-cycle off it: X is not nilpotent
        let mut t = Triplets::new();
        t.push(0, 0, 1.0);
        t.push(1, 1, 1.0);
        t.push(0, 1, 1.0);
        t.push(1, 0, 1.0);
        let zeta = t.into_csr(2, 2).unwrap();
        assert!(matches!(
            mobius_matrix(&zeta, 0, 5),
            Err(NerveError::DegenerateOperator { terms: 5, .. })
        ));
    }
}
