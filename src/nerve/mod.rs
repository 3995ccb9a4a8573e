//! The nerve of a poset of regions.
//!
//! `N[d]` holds the strictly decreasing chains `a0 > a1 > … > ad`. Levels
//! are built by [`chains::extend`] until a level comes out empty (acyclic
//! orders always reach one) or until the configured maximal degree.
//!
//! When construction stops on an empty level, that level is stored too so
//! that the coboundary of the top nonempty degree has a target.

mod chains;
mod poset;

pub use poset::Poset;

use indexmap::IndexSet;
use nalgebra_sparse::CsrMatrix;
use tracing::debug;

use crate::error::{NerveError, Result};
use crate::id::{tip, Chain, ChainId, Degree, RegionId};
use crate::region::Region;

#[derive(Clone, Debug)]
pub struct Nerve {
    poset: Poset,
    levels: Vec<IndexSet<Chain>>,
    /// Whether the last stored level could still be extended
    truncated: bool,
}

impl Nerve {
    /// Enumerate chains up to `max_degree` (all of them when `None`).
    ///
    /// Fails with `NonTerminating` on a cyclic order without a cap.
    pub fn build(poset: Poset, max_degree: Option<Degree>) -> Result<Self> {
        if max_degree.is_none() {
            if let Some(region) = poset.cycle_witness() {
                return Err(NerveError::NonTerminating { region });
            }
        }

        let mut levels = vec![chains::vertices(&poset)];
        let mut truncated = false;
        loop {
            let degree = levels.len() - 1;
            let current = &levels[degree];
            debug!(degree, chains = current.len(), "nerve level");
            if current.is_empty() {
                break;
            }
            if max_degree.is_some_and(|m| degree >= m) {
                truncated = !chains::extend(&poset, current).is_empty();
                break;
            }
            let next = chains::extend(&poset, current);
            levels.push(next);
        }

        Ok(Self {
            poset,
            levels,
            truncated,
        })
    }

    pub fn poset(&self) -> &Poset {
        &self.poset
    }

    /// Number of stored levels (degrees `0..depth()`).
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Highest degree with at least one chain, `None` for an empty poset.
    pub fn dim(&self) -> Option<Degree> {
        self.levels.iter().rposition(|level| !level.is_empty())
    }

    /// True when a degree cap cut off nonempty levels.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn level(&self, degree: Degree) -> Result<&IndexSet<Chain>> {
        self.levels.get(degree).ok_or(NerveError::MissingDegree {
            operator: "nerve",
            degree,
            available: self.levels.len(),
        })
    }

    /// Number of degree-d chains (zero past the stored levels).
    pub fn count(&self, degree: Degree) -> usize {
        self.levels.get(degree).map_or(0, IndexSet::len)
    }

    pub fn chain(&self, degree: Degree, id: ChainId) -> Result<&Chain> {
        let level = self.level(degree)?;
        level.get_index(id).ok_or(NerveError::IndexOutOfRange {
            index: id,
            size: level.len(),
        })
    }

    pub fn index_of(&self, degree: Degree, chain: &[RegionId]) -> Result<ChainId> {
        self.level(degree)?
            .get_index_of(chain)
            .ok_or_else(|| NerveError::InvalidKey {
                degree,
                key: chain.to_vec(),
            })
    }

    /// The degree-d chains as a flat buffer, `d + 1` entries per chain.
    pub fn keys(&self, degree: Degree) -> Result<Vec<RegionId>> {
        Ok(self.level(degree)?.iter().flatten().copied().collect())
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.poset.region(id)
    }

    pub fn regions(&self) -> &IndexSet<Region> {
        self.poset.regions()
    }

    /// The tip region of the `id`-th degree-d chain.
    pub fn tip_of(&self, degree: Degree, id: ChainId) -> Result<RegionId> {
        self.chain(degree, id).map(|c| tip(c))
    }

    /// Adjacency of the strict order (`A[a, b] = 1` iff `b < a`).
    pub fn adjacency(&self) -> Result<CsrMatrix<f64>> {
        self.poset.adjacency()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NerveConfig;
    use crate::hypergraph::Hypergraph;

    fn triangle() -> Nerve {
        Hypergraph::new([[0, 1], [1, 2], [0, 2]])
            .nerve(&NerveConfig::default())
            .unwrap()
    }

    #[test]
    fn test_triangle_levels() {
        let n = triangle();
        assert_eq!(n.count(0), 6);
        // each edge covers two vertices
        assert_eq!(n.count(1), 6);
        assert_eq!(n.count(2), 0);
        assert_eq!(n.depth(), 3);
        assert_eq!(n.dim(), Some(1));
        assert!(!n.is_truncated());
    }

    #[test]
    fn test_chain_lookup_roundtrip() {
        let n = triangle();
        for d in 0..n.depth() {
            for (i, chain) in n.level(d).unwrap().iter().enumerate() {
                assert_eq!(n.index_of(d, chain).unwrap(), i);
            }
        }
        assert!(matches!(
            n.index_of(1, &[3, 4]),
            Err(NerveError::InvalidKey { degree: 1, .. })
        ));
    }

    #[test]
    fn test_keys_are_flat() {
        let n = triangle();
        let keys = n.keys(1).unwrap();
        assert_eq!(keys.len(), 12);
        for pair in keys.chunks(2) {
            assert!(n.poset().lt(pair[1], pair[0]));
        }
    }

    #[test]
    fn test_cyclic_order_needs_cap() {
        let regions = vec![Region::from([0]), Region::from([1])];
        let poset = Poset::with_order(regions, &[(0, 1), (1, 0)]).unwrap();
        assert!(matches!(
            Nerve::build(poset.clone(), None),
            Err(NerveError::NonTerminating { .. })
        ));
        let capped = Nerve::build(poset, Some(3)).unwrap();
        assert_eq!(capped.depth(), 4);
        assert_eq!(capped.count(3), 2);
        assert!(capped.is_truncated());
    }

    #[test]
    fn test_cap_below_height() {
        let n = Hypergraph::new(vec![vec![0, 1, 2], vec![0, 1], vec![0]])
            .nerve(&NerveConfig::default().with_max_degree(1))
            .unwrap();
        assert_eq!(n.depth(), 2);
        assert!(n.is_truncated());
        assert!(n.level(2).is_err());
    }
}
