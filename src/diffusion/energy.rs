//! Local free energies, Gibbs states and the effective-energy gradient.
//!
//! Energies are degree-0 fields: `H_a` on the fiber `F(a)`. Every
//! exponential is taken after subtracting the fiber minimum, so large
//! energies do not overflow. Non-finite inputs produce non-finite outputs.

use std::rc::Rc;

use nalgebra::DVector;

use crate::config::check_beta;
use crate::domain::{Field, GradedDomain};
use crate::error::Result;

/// Minimum of each fiber, as a field on the scalar domain.
pub fn fiber_minima(h: &Field) -> Result<Field> {
    fiber_reduce(h, |fiber| fiber.iter().copied().fold(f64::INFINITY, f64::min))
}

fn fiber_reduce(h: &Field, f: impl Fn(&[f64]) -> f64) -> Result<Field> {
    let domain = h.domain();
    let count = domain.layout(h.degree())?.len();
    let values = (0..count)
        .map(|i| h.fiber(i).map(&f))
        .collect::<Result<Vec<_>>>()?;
    domain.scalars()?.field(h.degree(), DVector::from_vec(values))
}

/// Local free energy `F_a = −(1/β) log Σ_x exp(−β H_a(x))` per fiber.
pub fn free_energy(h: &Field, beta: f64) -> Result<Field> {
    check_beta(beta)?;
    fiber_reduce(h, |fiber| {
        let m = fiber.iter().copied().fold(f64::INFINITY, f64::min);
        let z: f64 = fiber.iter().map(|&x| (-beta * (x - m)).exp()).sum();
        m - z.ln() / beta
    })
}

/// Bethe free energy `Σ_a c[a] F_a` of a degree-0 energy.
pub fn free_bethe(h: &Field, beta: f64) -> Result<f64> {
    let local = free_energy(h, beta)?;
    let counting = h.domain().bethe()?;
    Ok(counting.data().dot(local.data()))
}

/// Normalised Boltzmann weights `exp(−βH) / Σ_fiber exp(−βH)`.
pub fn gibbs(h: &Field, beta: f64) -> Result<Field> {
    check_beta(beta)?;
    h.clone().map_fibers(|fiber| {
        let m = fiber.iter().copied().fold(f64::INFINITY, f64::min);
        let mut z = 0.0;
        for x in fiber.iter_mut() {
            *x = (-beta * (*x - m)).exp();
            z += *x;
        }
        for x in fiber.iter_mut() {
            *x /= z;
        }
    })
}

/// Energy of a probability field, `−log(p) / β`.
pub fn ln(p: &Field, beta: f64) -> Result<Field> {
    check_beta(beta)?;
    Ok(p.map(|x| -x.ln() / beta))
}

/// Average of each fiber, broadcast back over the fiber.
pub fn fiber_means(h: &Field) -> Result<Field> {
    let domain = h.domain();
    let means = domain.means(h.degree())?.apply(h)?;
    domain.from_scalars(h.degree())?.apply(&means)
}

/// `h` minus its fiber means.
pub fn centred(h: &Field) -> Result<Field> {
    h.try_sub(&fiber_means(h)?)
}

/// Effective-energy gradient on 1-chains.
///
/// For `a > b`, `D_β(H)_{a>b} = H_b − F_{a→b}(H_a)` where
/// `F_{a→b}(H_a)(y) = −(1/β) log Σ_{x ↦ y} exp(−β H_a(x))` is the
/// effective energy of `H_a` marginalised onto `F(b)`. Vanishes exactly
/// when every marginal of every Gibbs state is consistent.
pub fn deff(h: &Field, beta: f64) -> Result<Field> {
    check_beta(beta)?;
    let domain: &Rc<GradedDomain> = h.domain();
    let scalars = domain.scalars()?;

    let shift = fiber_minima(h)?;
    let shifted = h.try_sub(&domain.from_scalars(0)?.apply(&shift)?)?;
    let weights = shifted.map(|x| (-beta * x).exp());
    let marginals = domain.face(1, 1)?.transpose().apply(&weights)?;
    let effective = marginals.map(|z| z.ln() / beta);

    let shift1 = scalars.face(1, 1)?.transpose().apply(&shift)?;
    let shift1 = domain.from_scalars(1)?.apply(&shift1)?;

    let copied = domain.face(1, 0)?.transpose().apply(h)?;
    copied.try_add(&effective)?.try_sub(&shift1)
}
