//! Chain enumeration.
//!
//! Degree `d + 1` chains are degree `d` chains extended by one region
//! strictly below their tip. Every level is kept in canonical order: by
//! tip first, then lexicographically on the region tuple.

use indexmap::IndexSet;

use crate::id::{tip, Chain};
use crate::nerve::Poset;

/// Sort chains canonically and collect them into an ordered set.
pub(crate) fn canonical(mut chains: Vec<Chain>) -> IndexSet<Chain> {
    chains.sort_by(|a, b| tip(a).cmp(&tip(b)).then_with(|| a.cmp(b)));
    chains.into_iter().collect()
}

/// The degree-0 level: one singleton chain per region.
pub(crate) fn vertices(poset: &Poset) -> IndexSet<Chain> {
    (0..poset.len()).map(|a| vec![a]).collect()
}

/// Extend every chain of `level` by each region below its tip.
pub(crate) fn extend(poset: &Poset, level: &IndexSet<Chain>) -> IndexSet<Chain> {
    let mut next = Vec::new();
    for chain in level {
        for b in poset.below(tip(chain)) {
            let mut longer = Vec::with_capacity(chain.len() + 1);
            longer.extend_from_slice(chain);
            longer.push(b as usize);
            next.push(longer);
        }
    }
    canonical(next)
}
