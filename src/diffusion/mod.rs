//! Belief-propagation style diffusions on degree-0 energies.
//!
//! A state is a degree-0 field `H`: one local energy `H_a` per region. The
//! effective-energy gradient [`deff`] measures, on every 1-chain `a > b`,
//! how far the marginal of `H_a` on `F(b)` is from `H_b`. The vector fields
//! in [`flow`] push that gradient back onto regions and are integrated with
//! [`Euler`].

pub mod energy;
pub mod flow;
pub mod integrator;

pub use energy::{centred, deff, fiber_means, fiber_minima, free_bethe, free_energy, gibbs, ln};
pub use flow::{Flow, VectorField};
pub use integrator::{Euler, Integration};

use crate::config::DiffusionConfig;
use crate::domain::Field;
use crate::error::Result;

/// Integrate the configured vector field from `initial`.
pub fn diffuse(initial: Field, config: &DiffusionConfig) -> Result<Integration> {
    let field = VectorField::from_config(config)?;
    Euler::from_config(config)?.run(&field, initial)
}
