//! Property tests for local free energies and the effective-energy gradient

mod generators;

use hypernerve::diffusion::{centred, deff, free_energy, gibbs, ln};
use hypernerve::Functor;
use proptest::prelude::*;

fn assert_close(a: &hypernerve::Field, b: &hypernerve::Field, tol: f64) -> Result<(), TestCaseError> {
    prop_assert_eq!(a.len(), b.len());
    for (x, y) in a.data().iter().zip(b.data().iter()) {
        prop_assert!((x - y).abs() < tol, "{} != {}", x, y);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Gibbs states are normalised on every region
    #[test]
    fn gibbs_is_normalised(
        (graph, functor) in generators::arb_setup(),
        coeffs in generators::arb_coefficients(),
        beta in 0.25f64..4.0,
    ) {
        let dom = generators::build_domain(&graph, functor);
        let h = generators::field_from(&dom, 0, &coeffs);
        let p = gibbs(&h, beta).unwrap();
        prop_assert!(p.data().iter().all(|&x| x > 0.0));
        let mass = dom.to_scalars(0).unwrap().apply(&p).unwrap();
        prop_assert!(mass.data().iter().all(|&m| (m - 1.0).abs() < 1e-9));
    }

    /// `ln ∘ gibbs` recovers the energy up to fiber constants
    #[test]
    fn ln_inverts_gibbs_up_to_constants(
        (graph, functor) in generators::arb_setup(),
        coeffs in generators::arb_coefficients(),
        beta in 0.25f64..4.0,
    ) {
        let dom = generators::build_domain(&graph, functor);
        let h = generators::field_from(&dom, 0, &coeffs);
        let back = ln(&gibbs(&h, beta).unwrap(), beta).unwrap();
        assert_close(&centred(&back).unwrap(), &centred(&h).unwrap(), 1e-9)?;
    }

    /// A global energy offset does not move the gradient
    #[test]
    fn deff_ignores_global_offsets(
        (graph, functor) in generators::arb_setup(),
        coeffs in generators::arb_coefficients(),
        offset in -10.0f64..10.0,
    ) {
        let dom = generators::build_domain(&graph, functor);
        let h = generators::field_from(&dom, 0, &coeffs);
        let shifted = h.try_add(&dom.ones(0).unwrap().scale(offset)).unwrap();
        assert_close(&deff(&shifted, 1.0).unwrap(), &deff(&h, 1.0).unwrap(), 1e-9)?;
    }

    /// With scalar fibers the gradient is `H_b − H_a`, zero on constants
    #[test]
    fn deff_vanishes_on_constants(graph in generators::arb_small_hypergraph(), c in -5.0f64..5.0) {
        let dom = generators::build_domain(&graph, Functor::Trivial);
        let h = dom.ones(0).unwrap().scale(c);
        prop_assert!(deff(&h, 1.0).unwrap().max_abs() < 1e-12);
    }

    /// `D_β(H) = D_1(βH) / β`
    #[test]
    fn deff_scales_with_beta(
        (graph, functor) in generators::arb_setup(),
        coeffs in generators::arb_coefficients(),
        beta in 0.25f64..3.0,
    ) {
        let dom = generators::build_domain(&graph, functor);
        let h = generators::field_from(&dom, 0, &coeffs);
        let direct = deff(&h, beta).unwrap();
        let rescaled = deff(&h.scale(beta), 1.0).unwrap().scale(1.0 / beta);
        assert_close(&direct, &rescaled, 1e-8)?;
    }

    /// Local free energies lie below the fiber minimum
    #[test]
    fn free_energy_is_bounded_by_minimum(
        (graph, functor) in generators::arb_setup(),
        coeffs in generators::arb_coefficients(),
    ) {
        let dom = generators::build_domain(&graph, functor);
        let h = generators::field_from(&dom, 0, &coeffs);
        let f = free_energy(&h, 1.0).unwrap();
        for i in 0..dom.nerve().count(0) {
            let fiber = h.fiber(i).unwrap();
            let min = fiber.iter().copied().fold(f64::INFINITY, f64::min);
            prop_assert!(f.data()[i] <= min + 1e-12);
            prop_assert!(f.data()[i] >= min - (fiber.len() as f64).ln() - 1e-12);
        }
    }
}
