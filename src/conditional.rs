//! Conditional energies of one atom, and a Gibbs sampler built on them.
//!
//! Given a global configuration `x` (one state per atom) and an atom `i`,
//! `Cond_{i,x}` maps degree-0 energies to the energies of the states of
//! `i` with every other atom frozen: row `v` sums `H_a(x[i ← v]|_a)` over
//! the regions `a ∋ i`. Only free functors have global configurations.

use std::rc::Rc;

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::config::check_beta;
use crate::domain::{Field, GradedDomain};
use crate::error::{NerveError, Result};
use crate::functor::AtomShapes;
use crate::id::Atom;
use crate::linear::Triplets;

#[derive(Debug)]
pub struct Conditioner {
    domain: Rc<GradedDomain>,
    shapes: AtomShapes,
    atoms: Vec<Atom>,
}

impl Conditioner {
    pub fn new(domain: &Rc<GradedDomain>) -> Result<Self> {
        let shapes = domain
            .functor()
            .atom_shapes()
            .cloned()
            .ok_or_else(|| {
                NerveError::InvalidConfig("conditioning needs a free functor".to_string())
            })?;
        let mut atoms: Vec<Atom> = domain
            .nerve()
            .regions()
            .iter()
            .flat_map(|r| r.atoms().iter().copied())
            .collect();
        atoms.sort_unstable();
        atoms.dedup();
        Ok(Self {
            domain: Rc::clone(domain),
            shapes,
            atoms,
        })
    }

    /// Atoms covered by some region, ascending.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Number of states of `atom`.
    pub fn states(&self, atom: Atom) -> Result<usize> {
        self.shapes.size(atom)
    }

    /// Length a configuration must have: one entry per atom label up to
    /// the largest.
    pub fn width(&self) -> usize {
        self.atoms.last().map_or(0, |&a| a + 1)
    }

    fn check_config(&self, config: &[usize]) -> Result<()> {
        for &j in &self.atoms {
            let x = *config.get(j).ok_or(NerveError::UnknownAtom(j))?;
            let n = self.states(j)?;
            if x >= n {
                return Err(NerveError::IndexOutOfRange { index: x, size: n });
            }
        }
        Ok(())
    }

    /// `Cond_{atom, config}`.
    pub fn condition(&self, atom: Atom, config: &[usize]) -> Result<ConditionalMap> {
        if self.atoms.binary_search(&atom).is_err() {
            return Err(NerveError::UnknownAtom(atom));
        }
        self.check_config(config)?;
        let states = self.states(atom)?;
        let layout = self.domain.layout(0)?;

        let mut triplets = Triplets::new();
        let mut coords = Vec::new();
        for (a, region) in self.domain.nerve().regions().iter().enumerate() {
            if !region.contains(atom) {
                continue;
            }
            let shape = self.domain.object(a)?;
            for v in 0..states {
                coords.clear();
                coords.extend(
                    region
                        .atoms()
                        .iter()
                        .map(|&j| if j == atom { v } else { config[j] }),
                );
                triplets.push(v, layout.begin()[a] + shape.index(&coords)?, 1.0);
            }
        }
        trace!(atom, entries = triplets.len(), "conditional map");
        Ok(ConditionalMap {
            atom,
            domain: Rc::clone(&self.domain),
            matrix: triplets.into_csr(states, layout.total())?,
        })
    }
}

/// `Cond_{i,x}` for one atom and configuration.
#[derive(Debug)]
pub struct ConditionalMap {
    atom: Atom,
    domain: Rc<GradedDomain>,
    matrix: CsrMatrix<f64>,
}

impl ConditionalMap {
    pub fn atom(&self) -> Atom {
        self.atom
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Energy of each state of the atom.
    pub fn energies(&self, h: &Field) -> Result<DVector<f64>> {
        if h.degree() != 0 || !h.domain().same_layout(&self.domain) {
            return Err(NerveError::DomainMismatch {
                operator: "condition",
            });
        }
        let x = h.data();
        Ok(DVector::from_iterator(
            self.matrix.nrows(),
            self.matrix
                .row_iter()
                .map(|row| {
                    row.col_indices()
                        .iter()
                        .zip(row.values())
                        .map(|(&j, &w)| w * x[j])
                        .sum::<f64>()
                }),
        ))
    }

    /// `P(x_i = v | x_{~i})`: softmin of the conditional energies.
    pub fn probabilities(&self, h: &Field, beta: f64) -> Result<DVector<f64>> {
        check_beta(beta)?;
        let energies = self.energies(h)?;
        let m = energies.min();
        let weights = energies.map(|e| (-beta * (e - m)).exp());
        let z = weights.sum();
        Ok(weights / z)
    }
}

/// Single-site Gibbs sampling from the conditionals of an energy.
#[derive(Debug)]
pub struct GibbsSampler {
    conditioner: Conditioner,
    beta: f64,
    state: Vec<usize>,
    rng: StdRng,
}

impl GibbsSampler {
    /// Start from the all-zero configuration.
    pub fn new(domain: &Rc<GradedDomain>, beta: f64, seed: u64) -> Result<Self> {
        check_beta(beta)?;
        let conditioner = Conditioner::new(domain)?;
        let state = vec![0; conditioner.width()];
        Ok(Self {
            conditioner,
            beta,
            state,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_state(mut self, state: Vec<usize>) -> Result<Self> {
        self.conditioner.check_config(&state)?;
        self.state = state;
        Ok(self)
    }

    pub fn state(&self) -> &[usize] {
        &self.state
    }

    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }

    /// Redraw one atom from its conditional.
    pub fn resample(&mut self, atom: Atom, h: &Field) -> Result<usize> {
        let probabilities = self
            .conditioner
            .condition(atom, &self.state)?
            .probabilities(h, self.beta)?;
        let dist = WeightedIndex::new(probabilities.iter().copied())
            .map_err(|e| NerveError::InvalidConfig(format!("atom {}: {}", atom, e)))?;
        let v = dist.sample(&mut self.rng);
        self.state[atom] = v;
        Ok(v)
    }

    /// Redraw a uniformly chosen atom.
    pub fn step(&mut self, h: &Field) -> Result<(Atom, usize)> {
        let atoms = self.conditioner.atoms();
        if atoms.is_empty() {
            return Err(NerveError::InvalidConfig("no atoms to sample".to_string()));
        }
        let atom = atoms[self.rng.gen_range(0..atoms.len())];
        let v = self.resample(atom, h)?;
        Ok((atom, v))
    }

    /// Redraw every atom once, in ascending order.
    pub fn sweep(&mut self, h: &Field) -> Result<()> {
        for k in 0..self.conditioner.atoms().len() {
            let atom = self.conditioner.atoms()[k];
            self.resample(atom, h)?;
        }
        Ok(())
    }
}
