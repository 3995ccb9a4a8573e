//! Dense coefficient vectors on one degree of a graded domain.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use nalgebra::DVector;

use crate::domain::GradedDomain;
use crate::error::{NerveError, Result};
use crate::id::{ChainId, Degree, RegionId};

#[derive(Clone)]
pub struct Field {
    domain: Rc<GradedDomain>,
    degree: Degree,
    data: DVector<f64>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("degree", &self.degree)
            .field("data", &self.data.as_slice())
            .finish()
    }
}

impl Field {
    /// Length must already match the layout.
    pub(crate) fn from_parts(domain: Rc<GradedDomain>, degree: Degree, data: DVector<f64>) -> Self {
        debug_assert_eq!(domain.size(degree).ok(), Some(data.len()));
        Self {
            domain,
            degree,
            data,
        }
    }

    pub fn domain(&self) -> &Rc<GradedDomain> {
        &self.domain
    }

    pub fn degree(&self) -> Degree {
        self.degree
    }

    pub fn data(&self) -> &DVector<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DVector<f64> {
        &mut self.data
    }

    pub fn into_data(self) -> DVector<f64> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values on the fiber of the `i`-th chain.
    pub fn fiber(&self, i: ChainId) -> Result<&[f64]> {
        let range = self.domain.layout(self.degree)?.range(i)?;
        Ok(&self.data.as_slice()[range])
    }

    pub fn fiber_mut(&mut self, i: ChainId) -> Result<&mut [f64]> {
        let range = self.domain.layout(self.degree)?.range(i)?;
        Ok(&mut self.data.as_mut_slice()[range])
    }

    /// Values on the fiber of a chain given by its regions.
    pub fn fiber_of(&self, chain: &[RegionId]) -> Result<&[f64]> {
        self.fiber(self.domain.index(self.degree, chain)?)
    }

    /// Apply `f` to every fiber in place.
    pub fn map_fibers(mut self, mut f: impl FnMut(&mut [f64])) -> Result<Self> {
        let layout = self.domain.layout(self.degree)?.clone();
        let data = self.data.as_mut_slice();
        for i in 0..layout.len() {
            f(&mut data[layout.range(i)?]);
        }
        Ok(self)
    }

    /// Coefficient-wise map.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            domain: Rc::clone(&self.domain),
            degree: self.degree,
            data: self.data.map(f),
        }
    }

    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, x| m.max(x.abs()))
    }

    /// Same degree of domains with the same layout.
    pub fn is_compatible(&self, other: &Field) -> bool {
        self.degree == other.degree && self.domain.same_layout(&other.domain)
    }

    fn check(&self, other: &Field, operator: &'static str) -> Result<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(NerveError::DomainMismatch { operator })
        }
    }

    pub fn try_add(&self, other: &Field) -> Result<Field> {
        self.check(other, "add")?;
        Ok(self.with_data(&self.data + &other.data))
    }

    pub fn try_sub(&self, other: &Field) -> Result<Field> {
        self.check(other, "sub")?;
        Ok(self.with_data(&self.data - &other.data))
    }

    /// Coefficient-wise product.
    pub fn try_mul(&self, other: &Field) -> Result<Field> {
        self.check(other, "mul")?;
        Ok(self.with_data(self.data.component_mul(&other.data)))
    }

    /// `self + factor · other`
    pub fn axpy(&mut self, factor: f64, other: &Field) -> Result<()> {
        self.check(other, "axpy")?;
        self.data.axpy(factor, &other.data, 1.0);
        Ok(())
    }

    pub fn scale(&self, factor: f64) -> Field {
        self.with_data(&self.data * factor)
    }

    /// Same domain and degree, new coefficients.
    pub(crate) fn with_data(&self, data: DVector<f64>) -> Field {
        Field::from_parts(Rc::clone(&self.domain), self.degree, data)
    }
}

impl Add<&Field> for &Field {
    type Output = Result<Field>;

    fn add(self, rhs: &Field) -> Result<Field> {
        self.try_add(rhs)
    }
}

impl Sub<&Field> for &Field {
    type Output = Result<Field>;

    fn sub(self, rhs: &Field) -> Result<Field> {
        self.try_sub(rhs)
    }
}

impl Mul<f64> for &Field {
    type Output = Field;

    fn mul(self, rhs: f64) -> Field {
        self.scale(rhs)
    }
}

impl Mul<&Field> for f64 {
    type Output = Field;

    fn mul(self, rhs: &Field) -> Field {
        rhs.scale(self)
    }
}

impl Neg for &Field {
    type Output = Field;

    fn neg(self) -> Field {
        self.scale(-1.0)
    }
}

impl Neg for Field {
    type Output = Field;

    fn neg(mut self) -> Field {
        self.data.neg_mut();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NerveConfig;
    use crate::functor::Functor;
    use crate::hypergraph::Hypergraph;
    use std::sync::Arc;

    fn edge(functor: Functor) -> Rc<GradedDomain> {
        let nerve = Hypergraph::new([[0, 1]])
            .nerve(&NerveConfig::default())
            .unwrap();
        GradedDomain::new(Arc::new(nerve), functor).unwrap()
    }

    #[test]
    fn test_fibers() {
        let dom = edge(Functor::ising());
        let f = dom.range(0).unwrap();
        // a single region {0, 1}
        assert_eq!(f.fiber(0).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(f.fiber_of(&[0]).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert!(f.fiber(1).is_err());
    }

    #[test]
    fn test_arithmetic() {
        let dom = edge(Functor::free(3));
        let a = dom.ones(0).unwrap();
        let b = dom.range(0).unwrap();
        let c = (&a + &b).unwrap();
        assert_eq!(c.data()[8], 9.0);
        let d = (&c - &a).unwrap();
        assert_eq!(d.data(), b.data());
        assert_eq!((&a * 2.0).sum(), 18.0);
        assert_eq!((-&a).sum(), -9.0);
    }

    #[test]
    fn test_incompatible_fields() {
        let a = edge(Functor::ising()).zeros(0).unwrap();
        let b = edge(Functor::ising()).zeros(0).unwrap();
        // different nerves
        assert!(matches!(
            a.try_add(&b),
            Err(NerveError::DomainMismatch { operator: "add" })
        ));
    }

    #[test]
    fn test_map_fibers() {
        let dom = edge(Functor::ising());
        let f = dom
            .range(0)
            .unwrap()
            .map_fibers(|fiber| fiber.reverse())
            .unwrap();
        assert_eq!(f.data().as_slice(), &[3.0, 2.0, 1.0, 0.0]);
    }
}
