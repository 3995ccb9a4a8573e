//! Proptest generators for hypernerve data structures
//!
//! Hypergraphs are kept small (a handful of regions over at most six atoms)
//! so that chain enumeration and dense comparisons stay cheap.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use hypernerve::{AtomShapes, Functor, GradedDomain, Hypergraph, NerveConfig, Region};
use nalgebra::DVector;
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

// ============================================================================
// Regions and hypergraphs
// ============================================================================

/// Parameters for hypergraph generation
#[derive(Debug, Clone)]
pub struct HypergraphParams {
    pub num_atoms: usize,
    pub max_regions: usize,
    pub max_region_len: usize,
}

impl Default for HypergraphParams {
    fn default() -> Self {
        Self {
            num_atoms: 5,
            max_regions: 4,
            max_region_len: 3,
        }
    }
}

/// A nonempty region over atoms `0..num_atoms`.
pub fn arb_region(num_atoms: usize, max_len: usize) -> impl Strategy<Value = Region> {
    btree_set(0..num_atoms, 1..=max_len).prop_map(Region::new)
}

pub fn arb_hypergraph(params: HypergraphParams) -> impl Strategy<Value = Hypergraph> {
    vec(
        arb_region(params.num_atoms, params.max_region_len),
        1..=params.max_regions,
    )
    .prop_map(Hypergraph::new)
}

pub fn arb_small_hypergraph() -> impl Strategy<Value = Hypergraph> {
    arb_hypergraph(HypergraphParams::default())
}

// ============================================================================
// Functors
// ============================================================================

pub fn arb_functor(num_atoms: usize) -> impl Strategy<Value = Functor> {
    prop_oneof![
        Just(Functor::Trivial),
        Just(Functor::ising()),
        (1usize..=3).prop_map(Functor::free),
        vec(1usize..=3, num_atoms).prop_map(|sizes| {
            Functor::Free(AtomShapes::PerAtom(
                sizes.into_iter().enumerate().collect::<BTreeMap<_, _>>(),
            ))
        }),
    ]
}

/// A hypergraph together with a functor defined on all of its atoms.
pub fn arb_setup() -> impl Strategy<Value = (Hypergraph, Functor)> {
    let params = HypergraphParams::default();
    let num_atoms = params.num_atoms;
    (arb_hypergraph(params), arb_functor(num_atoms))
}

// ============================================================================
// Domains and fields
// ============================================================================

/// Close, build the nerve and lay out fibers.
pub fn build_domain(graph: &Hypergraph, functor: Functor) -> Rc<GradedDomain> {
    let nerve = graph.nerve(&NerveConfig::default()).unwrap();
    GradedDomain::new(Arc::new(nerve), functor).unwrap()
}

/// Bounded coefficients, long enough for any domain built from
/// [`arb_setup`]; truncate to the size needed.
pub fn arb_coefficients() -> impl Strategy<Value = Vec<f64>> {
    vec(-3.0f64..3.0, 512)
}

pub fn field_from(dom: &Rc<GradedDomain>, degree: usize, coefficients: &[f64]) -> hypernerve::Field {
    let n = dom.size(degree).unwrap();
    let data = DVector::from_iterator(n, coefficients.iter().copied().cycle().take(n));
    dom.field(degree, data).unwrap()
}
