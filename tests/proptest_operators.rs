//! Property tests for the chain complex, zeta/Möbius inversion and Bethe numbers

mod generators;

use nalgebra::DMatrix;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// `δ∘δ = 0` and `d∘d = 0`
    #[test]
    fn boundary_squares_to_zero((graph, functor) in generators::arb_setup()) {
        let dom = generators::build_domain(&graph, functor);
        for d in 2..dom.depth() {
            let dd = dom.delta(d - 1).unwrap().compose(&dom.delta(d).unwrap()).unwrap();
            prop_assert!(dd.max_abs() < 1e-6);
        }
        for d in 0..dom.depth().saturating_sub(2) {
            let dd = dom.d(d + 1).unwrap().compose(&dom.d(d).unwrap()).unwrap();
            prop_assert!(dd.max_abs() < 1e-6);
        }
    }

    /// `μ∘ζ = I = ζ∘μ` in every degree
    #[test]
    fn mobius_inverts_zeta((graph, functor) in generators::arb_setup()) {
        let dom = generators::build_domain(&graph, functor);
        for d in 0..dom.depth() {
            let zeta = dom.zeta(d).unwrap();
            let mu = dom.mobius(d).unwrap();
            let n = dom.size(d).unwrap();
            let eye = DMatrix::<f64>::identity(n, n);
            prop_assert!((mu.compose(&zeta).unwrap().to_dense() - &eye).norm() < 1e-6);
            prop_assert!((zeta.compose(&mu).unwrap().to_dense() - &eye).norm() < 1e-6);
        }
    }

    /// `Σ_{a ≥ b} c[a] = 1` for every region `b`
    #[test]
    fn bethe_numbers_cover_once((graph, functor) in generators::arb_setup()) {
        let dom = generators::build_domain(&graph, functor);
        let c = dom.bethe().unwrap();
        let scalars = dom.scalars().unwrap();
        let covered = scalars.zeta(0).unwrap().transpose().apply(&c).unwrap();
        for &x in covered.data().iter() {
            prop_assert!((x - 1.0).abs() < 1e-9);
        }
        // maximal regions count once
        let poset = dom.nerve().poset();
        for a in 0..poset.len() {
            if (0..poset.len()).all(|b| !poset.lt(a, b)) {
                prop_assert!((c.data()[a] - 1.0).abs() < 1e-9);
            }
        }
    }

    /// Zeta on the scalar domain counts the regions below
    #[test]
    fn scalar_zeta_counts_subregions(graph in generators::arb_small_hypergraph()) {
        let dom = generators::build_domain(&graph, hypernerve::Functor::Trivial);
        let counts = dom.zeta(0).unwrap().apply(&dom.ones(0).unwrap()).unwrap();
        let poset = dom.nerve().poset();
        for a in 0..poset.len() {
            prop_assert_eq!(counts.data()[a], (poset.below(a).len() + 1) as f64);
        }
    }

    /// Transpose is an adjoint: `⟨M x, y⟩ = ⟨x, Mᵀ y⟩`
    #[test]
    fn transpose_is_adjoint(
        (graph, functor) in generators::arb_setup(),
        xs in generators::arb_coefficients(),
        ys in generators::arb_coefficients(),
    ) {
        let dom = generators::build_domain(&graph, functor);
        let d0 = dom.d(0).unwrap();
        let x = generators::field_from(&dom, 0, &xs);
        let y = generators::field_from(&dom, 1, &ys);
        let lhs = d0.apply(&x).unwrap().data().dot(y.data());
        let rhs = x.data().dot(d0.transpose().apply(&y).unwrap().data());
        prop_assert!((lhs - rhs).abs() < 1e-9 * (1.0 + lhs.abs()));
    }
}
