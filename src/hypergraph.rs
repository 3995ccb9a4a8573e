//! Hypergraphs and their intersection closure.
//!
//! A hypergraph is a finite set of regions. Its closure is the smallest
//! superset closed under pairwise intersection; the nerve is built on the
//! closure so that every partial marginal has a region to land on.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::{ClosureConfig, NerveConfig};
use crate::error::{NerveError, Result};
use crate::id::Atom;
use crate::nerve::{Nerve, Poset};
use crate::region::Region;

/// A finite set of regions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hypergraph {
    regions: BTreeSet<Region>,
}

impl Hypergraph {
    pub fn new<I, R>(regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Region>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// Read an integer table with `arity` atoms per row.
    pub fn from_table(arity: usize, atoms: &[Atom]) -> Result<Self> {
        let mut graph = Self::default();
        graph.extend_from_table(arity, atoms)?;
        Ok(graph)
    }

    /// Read graded tables: `tables[k]` holds rows of `k + 1` atoms.
    pub fn from_graded(tables: &[Vec<Atom>]) -> Result<Self> {
        let mut graph = Self::default();
        for (k, table) in tables.iter().enumerate() {
            graph.extend_from_table(k + 1, table)?;
        }
        Ok(graph)
    }

    fn extend_from_table(&mut self, arity: usize, atoms: &[Atom]) -> Result<()> {
        if arity == 0 {
            if !atoms.is_empty() {
                return Err(NerveError::RankMismatch {
                    expected: 0,
                    found: atoms.len(),
                });
            }
            return Ok(());
        }
        if atoms.len() % arity != 0 {
            return Err(NerveError::RankMismatch {
                expected: arity,
                found: atoms.len() % arity,
            });
        }
        for row in atoms.chunks(arity) {
            self.regions.insert(Region::from(row));
        }
        Ok(())
    }

    /// All non-empty faces of the simplex on `vertices`.
    ///
    /// Faces are enumerated by bitmask, so at most 63 distinct vertices are
    /// accepted.
    pub fn simplex(vertices: &[Atom]) -> Result<Self> {
        let vertices: Vec<Atom> = Region::from(vertices).atoms().to_vec();
        let n = vertices.len();
        if n >= u64::BITS as usize {
            return Err(NerveError::InvalidConfig(format!(
                "a simplex on {} vertices has too many faces to enumerate",
                n
            )));
        }
        let regions = (1u64..(1u64 << n)).map(|mask| {
            vertices
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u64 << i) != 0)
                .map(|(_, &v)| v)
                .collect::<Region>()
        });
        Ok(Self {
            regions: regions.collect(),
        })
    }

    /// The cycle graph `0 - 1 - … - (n-1) - 0` (edges only).
    pub fn cycle(n: usize) -> Self {
        Self::new((0..n).map(|i| Region::new([i, (i + 1) % n])))
    }

    pub fn insert(&mut self, region: impl Into<Region>) -> bool {
        self.regions.insert(region.into())
    }

    pub fn contains(&self, region: &Region) -> bool {
        self.regions.contains(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Union of all regions.
    pub fn atoms(&self) -> BTreeSet<Atom> {
        self.regions
            .iter()
            .flat_map(|r| r.atoms().iter().copied())
            .collect()
    }

    /// Close under pairwise intersection.
    ///
    /// Each round intersects the regions found in the previous round with
    /// every known region, so each pair is visited once. Terminates because
    /// there are finitely many subsets of the atoms.
    pub fn closure(&self, config: &ClosureConfig) -> Hypergraph {
        let mut all: BTreeSet<Region> = self
            .regions
            .iter()
            .filter(|r| config.include_empty || !r.is_empty())
            .cloned()
            .collect();
        let mut frontier: Vec<Region> = all.iter().cloned().collect();
        let mut rounds = 0;

        while !frontier.is_empty() {
            let known: Vec<Region> = all.iter().cloned().collect();
            let mut next = Vec::new();
            for f in &frontier {
                for r in &known {
                    let meet = f.intersection(r);
                    if meet.is_empty() && !config.include_empty {
                        continue;
                    }
                    if all.insert(meet.clone()) {
                        next.push(meet);
                    }
                }
            }
            frontier = next;
            rounds += 1;
        }

        debug!(
            input = self.regions.len(),
            closed = all.len(),
            rounds,
            "closed hypergraph under intersection"
        );
        Hypergraph { regions: all }
    }

    pub fn is_closed(&self, config: &ClosureConfig) -> bool {
        self.closure(config) == *self
    }

    /// The inclusion order on the regions of this hypergraph (not closed).
    pub fn poset(&self) -> Poset {
        Poset::from_regions(self.regions.iter().cloned())
    }

    /// Close (if configured), order by inclusion, and enumerate chains.
    pub fn nerve(&self, config: &NerveConfig) -> Result<Nerve> {
        let poset = if config.close {
            self.closure(&config.closure).poset()
        } else {
            self.poset()
        };
        Nerve::build(poset, config.max_degree)
    }
}
