//! Strict orders on regions.
//!
//! Regions are numbered in canonical order (cardinality descending, then
//! lexicographic). For each region `a`, `below[a]` is the bitmap of
//! RegionIds `b` with `b < a`. For inclusion orders this relation is
//! transitive and acyclic; explicit orders are taken as given and may be
//! cyclic, in which case chain enumeration needs a degree cap.

use indexmap::IndexSet;
use nalgebra_sparse::CsrMatrix;
use roaring::RoaringBitmap;

use crate::error::{NerveError, Result};
use crate::id::{region_key, RegionId};
use crate::linear::Triplets;
use crate::region::Region;

#[derive(Clone, Debug)]
pub struct Poset {
    regions: IndexSet<Region>,
    below: Vec<RoaringBitmap>,
    /// A region lying on a cycle of the strict order, if any
    cycle: Option<RegionId>,
}

fn canonical(regions: impl IntoIterator<Item = Region>) -> IndexSet<Region> {
    let mut sorted: Vec<Region> = regions.into_iter().collect();
    sorted.sort_by(Region::canonical_cmp);
    sorted.dedup();
    sorted.into_iter().collect()
}

impl Poset {
    /// The inclusion order `b < a ⇔ b ⊊ a`.
    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let regions = canonical(regions);
        let below = regions
            .iter()
            .map(|a| {
                regions
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.is_strict_subset(a))
                    .map(|(j, _)| region_key(j))
                    .collect::<RoaringBitmap>()
            })
            .collect();
        Self {
            regions,
            below,
            cycle: None,
        }
    }

    /// An explicit strict order. Each relation `(a, b)` means `a > b`, with
    /// `a` and `b` indices into `regions` as given (before canonical
    /// reordering).
    pub fn with_order(regions: Vec<Region>, relations: &[(usize, usize)]) -> Result<Self> {
        let ordered = canonical(regions.iter().cloned());
        let remap = |i: usize| -> Result<RegionId> {
            let region = regions.get(i).ok_or(NerveError::IndexOutOfRange {
                index: i,
                size: regions.len(),
            })?;
            ordered
                .get_index_of(region)
                .ok_or_else(|| NerveError::UnknownRegion(region.atoms().to_vec()))
        };

        let mut below = vec![RoaringBitmap::new(); ordered.len()];
        for &(a, b) in relations {
            let (a, b) = (remap(a)?, remap(b)?);
            below[a].insert(region_key(b));
        }
        let cycle = find_cycle(&below);

        Ok(Self {
            regions: ordered,
            below,
            cycle,
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &IndexSet<Region> {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get_index(id)
    }

    pub fn index_of(&self, region: &Region) -> Option<RegionId> {
        self.regions.get_index_of(region)
    }

    /// Like [`index_of`](Self::index_of), failing with `UnknownRegion`.
    pub fn id(&self, region: &Region) -> Result<RegionId> {
        self.index_of(region)
            .ok_or_else(|| NerveError::UnknownRegion(region.atoms().to_vec()))
    }

    /// Regions strictly below `a`.
    pub fn below(&self, a: RegionId) -> &RoaringBitmap {
        &self.below[a]
    }

    /// `b < a`
    pub fn lt(&self, b: RegionId, a: RegionId) -> bool {
        self.below[a].contains(region_key(b))
    }

    /// `b ≤ a`
    pub fn le(&self, b: RegionId, a: RegionId) -> bool {
        a == b || self.lt(b, a)
    }

    pub fn is_acyclic(&self) -> bool {
        self.cycle.is_none()
    }

    /// A region on a cycle of the strict order, if there is one.
    pub fn cycle_witness(&self) -> Option<RegionId> {
        self.cycle
    }

    /// Number of strict inclusions in the longest chain, or `None` for
    /// cyclic orders.
    pub fn height(&self) -> Option<usize> {
        let order = topological_order(&self.below)?;
        let mut height = vec![0usize; self.len()];
        for &a in order.iter().rev() {
            height[a] = self.below[a]
                .iter()
                .map(|b| height[b as usize] + 1)
                .max()
                .unwrap_or(0);
        }
        Some(height.into_iter().max().unwrap_or(0))
    }

    /// Sparse adjacency of the strict order: `A[a, b] = 1` iff `b < a`.
    pub fn adjacency(&self) -> Result<CsrMatrix<f64>> {
        let mut triplets = Triplets::new();
        for (a, below) in self.below.iter().enumerate() {
            for b in below {
                triplets.push(a, b as usize, 1.0);
            }
        }
        triplets.into_csr(self.len(), self.len())
    }
}

/// Kahn's algorithm on the graph `a → b` for `b ∈ below[a]`.
/// Returns `None` if the graph has a cycle.
fn topological_order(below: &[RoaringBitmap]) -> Option<Vec<RegionId>> {
    let n = below.len();
    let mut indegree = vec![0usize; n];
    for bs in below {
        for b in bs {
            indegree[b as usize] += 1;
        }
    }
    let mut stack: Vec<RegionId> = (0..n).filter(|&a| indegree[a] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(a) = stack.pop() {
        order.push(a);
        for b in &below[a] {
            let b = b as usize;
            indegree[b] -= 1;
            if indegree[b] == 0 {
                stack.push(b);
            }
        }
    }
    (order.len() == n).then_some(order)
}

fn find_cycle(below: &[RoaringBitmap]) -> Option<RegionId> {
    if topological_order(below).is_some() {
        return None;
    }
    // Peel sinks: every survivor has a surviving successor, so walking
    // successors from any survivor must revisit a node on a cycle.
    let n = below.len();
    let mut alive = vec![true; n];
    loop {
        let mut changed = false;
        for a in 0..n {
            if alive[a] && !below[a].iter().any(|b| alive[b as usize]) {
                alive[a] = false;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    let mut seen = vec![false; n];
    let mut a = alive.iter().position(|&x| x)?;
    while !seen[a] {
        seen[a] = true;
        a = below[a].iter().map(|b| b as usize).find(|&b| alive[b])?;
    }
    Some(a)
}
