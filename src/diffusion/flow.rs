//! Vector fields on degree-0 energies.

use crate::config::{check_beta, DiffusionConfig, DiffusionKind};
use crate::diffusion::energy::{deff, free_bethe, free_energy};
use crate::domain::Field;
use crate::error::Result;

/// Anything that can be integrated: a velocity for every state.
pub trait Flow {
    fn eval(&self, state: &Field) -> Result<Field>;
}

impl<F> Flow for F
where
    F: Fn(&Field) -> Result<Field>,
{
    fn eval(&self, state: &Field) -> Result<Field> {
        self(state)
    }
}

/// The generalised belief propagation and Bethe diffusions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorField {
    kind: DiffusionKind,
    beta: f64,
}

impl VectorField {
    /// `V(H) = −(δ D_β(H) + broadcast(F(H)))`
    pub fn gbp(beta: f64) -> Result<Self> {
        check_beta(beta)?;
        Ok(Self {
            kind: DiffusionKind::Gbp,
            beta,
        })
    }

    /// `V(H) = −(δ D_β(H) + μ(broadcast(F_Bethe(H))))`
    pub fn gbp_mobius(beta: f64) -> Result<Self> {
        check_beta(beta)?;
        Ok(Self {
            kind: DiffusionKind::GbpMobius,
            beta,
        })
    }

    /// `V(H) = −(ζ δ μ D_β(H) + F_Bethe(H))`
    pub fn bethe(beta: f64) -> Result<Self> {
        check_beta(beta)?;
        Ok(Self {
            kind: DiffusionKind::Bethe,
            beta,
        })
    }

    pub fn from_config(config: &DiffusionConfig) -> Result<Self> {
        match config.kind {
            DiffusionKind::Gbp => Self::gbp(config.beta),
            DiffusionKind::GbpMobius => Self::gbp_mobius(config.beta),
            DiffusionKind::Bethe => Self::bethe(config.beta),
        }
    }

    pub fn kind(&self) -> DiffusionKind {
        self.kind
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Flow for VectorField {
    fn eval(&self, state: &Field) -> Result<Field> {
        match self.kind {
            DiffusionKind::Gbp => gbp(state, self.beta),
            DiffusionKind::GbpMobius => gbp_mobius(state, self.beta),
            DiffusionKind::Bethe => bethe(state, self.beta),
        }
    }
}

/// Each region moves by the messages it exchanges with its neighbours in
/// the nerve, minus its own free energy so that local partition functions
/// stay at 1.
fn gbp(h: &Field, beta: f64) -> Result<Field> {
    let domain = h.domain();
    let messages = domain.delta(1)?.apply(&deff(h, beta)?)?;
    let normal = domain.from_scalars(0)?.apply(&free_energy(h, beta)?)?;
    Ok(-messages.try_add(&normal)?)
}

/// Messages as in [`gbp`], gauged by the Möbius inverse of the global
/// Bethe free energy. The gauge is constant on every fiber, so only the
/// fiber means differ from [`gbp`]; those are not held in place.
fn gbp_mobius(h: &Field, beta: f64) -> Result<Field> {
    let domain = h.domain();
    let messages = domain.delta(1)?.apply(&deff(h, beta)?)?;
    let gauge = domain
        .mobius(0)?
        .apply(&domain.ones(0)?.scale(free_bethe(h, beta)?))?;
    Ok(-messages.try_add(&gauge)?)
}

/// Messages are Möbius-inverted on 1-chains and summed back over the
/// regions below with ζ; the global Bethe free energy normalises.
fn bethe(h: &Field, beta: f64) -> Result<Field> {
    let domain = h.domain();
    let d = deff(h, beta)?;
    let inverted = domain.mobius(1)?.apply(&d)?;
    let messages = domain.zeta(0)?.apply(&domain.delta(1)?.apply(&inverted)?)?;
    let normal = domain.ones(0)?.scale(free_bethe(h, beta)?);
    Ok(-messages.try_add(&normal)?)
}
