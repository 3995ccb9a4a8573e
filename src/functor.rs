//! Coefficient functors.
//!
//! A functor assigns a tensor shape to every region and, to every inclusion
//! `b ⊆ a`, a restriction table of length `|F(a)|` sending each coordinate
//! of `F(a)` to a coordinate of `F(b)`. Functoriality:
//! `F(a → a) = id` and `F(b → c) ∘ F(a → b) = F(a → c)`.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{NerveError, Result};
use crate::id::Atom;
use crate::region::Region;
use crate::shape::Shape;

/// Caller-provided functor.
pub trait FunctorMap: Debug {
    /// The shape attached to a region.
    fn obj(&self, region: &Region) -> Result<Shape>;

    /// The restriction table `F(from) → F(to)` for `to ⊆ from`.
    fn fmap(&self, from: &Region, to: &Region) -> Result<Vec<usize>>;
}

/// Number of states of each atom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomShapes {
    Uniform(usize),
    PerAtom(BTreeMap<Atom, usize>),
}

impl AtomShapes {
    pub fn size(&self, atom: Atom) -> Result<usize> {
        match self {
            AtomShapes::Uniform(n) => Ok(*n),
            AtomShapes::PerAtom(sizes) => {
                sizes.get(&atom).copied().ok_or(NerveError::UnknownAtom(atom))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Functor {
    /// Every region carries a single scalar.
    Trivial,
    /// `F(a) = ∏_{i ∈ a} shape(i)`, restrictions by projection.
    Free(AtomShapes),
    Custom(Arc<dyn FunctorMap>),
}

impl Functor {
    /// Free functor with `n` states per atom.
    pub fn free(n: usize) -> Self {
        Functor::Free(AtomShapes::Uniform(n))
    }

    /// Binary spins on every atom.
    pub fn ising() -> Self {
        Self::free(2)
    }

    pub fn custom(map: impl FunctorMap + 'static) -> Self {
        Functor::Custom(Arc::new(map))
    }

    pub fn is_trivial(&self) -> bool {
        matches!(self, Functor::Trivial)
    }

    pub fn atom_shapes(&self) -> Option<&AtomShapes> {
        match self {
            Functor::Free(shapes) => Some(shapes),
            _ => None,
        }
    }

    pub fn obj(&self, region: &Region) -> Result<Shape> {
        match self {
            Functor::Trivial => Ok(Shape::scalar()),
            Functor::Free(shapes) => region
                .atoms()
                .iter()
                .map(|&i| shapes.size(i))
                .collect::<Result<Vec<_>>>()
                .map(Shape::new),
            Functor::Custom(map) => map.obj(region),
        }
    }

    pub fn fmap(&self, from: &Region, to: &Region) -> Result<Vec<usize>> {
        match self {
            Functor::Trivial => Ok(vec![0]),
            Functor::Free(_) => {
                let js = to.positions_in(from).ok_or_else(|| NerveError::NotIncluded {
                    from: from.atoms().to_vec(),
                    to: to.atoms().to_vec(),
                })?;
                self.obj(from)?.res(&js)
            }
            Functor::Custom(map) => map.fmap(from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_is_scalar() {
        let f = Functor::Trivial;
        assert_eq!(f.obj(&Region::from([0, 1])).unwrap().size(), 1);
        assert_eq!(
            f.fmap(&Region::from([0, 1]), &Region::from([1])).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn test_free_obj_and_fmap() {
        let f = Functor::Free(AtomShapes::PerAtom(BTreeMap::from([(0, 2), (1, 3)])));
        let ab = Region::from([0, 1]);
        let b = Region::from([1]);
        assert_eq!(f.obj(&ab).unwrap().dims(), &[2, 3]);
        assert_eq!(f.fmap(&ab, &b).unwrap(), vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(f.fmap(&ab, &ab).unwrap(), (0..6).collect::<Vec<_>>());
        assert_eq!(
            f.obj(&Region::from([5])),
            Err(NerveError::UnknownAtom(5))
        );
    }

    #[test]
    fn test_free_fmap_composes() {
        let f = Functor::free(2);
        let abc = Region::from([0, 1, 2]);
        let bc = Region::from([1, 2]);
        let c = Region::from([2]);
        let ab_bc = f.fmap(&abc, &bc).unwrap();
        let bc_c = f.fmap(&bc, &c).unwrap();
        let abc_c = f.fmap(&abc, &c).unwrap();
        let composed: Vec<usize> = ab_bc.iter().map(|&x| bc_c[x]).collect();
        assert_eq!(composed, abc_c);
    }

    #[test]
    fn test_fmap_requires_inclusion() {
        let f = Functor::ising();
        assert!(matches!(
            f.fmap(&Region::from([0]), &Region::from([1])),
            Err(NerveError::NotIncluded { .. })
        ));
    }

    #[derive(Debug)]
    struct Doubled;

    impl FunctorMap for Doubled {
        fn obj(&self, region: &Region) -> Result<Shape> {
            Ok(Shape::new(vec![2 * region.len().max(1)]))
        }

        fn fmap(&self, from: &Region, to: &Region) -> Result<Vec<usize>> {
            let target = self.obj(to)?.size();
            Ok((0..self.obj(from)?.size()).map(|x| x % target).collect())
        }
    }

    #[test]
    fn test_custom_functor() {
        let f = Functor::custom(Doubled);
        assert_eq!(f.obj(&Region::from([0, 1])).unwrap().size(), 4);
        assert_eq!(
            f.fmap(&Region::from([0, 1]), &Region::from([0])).unwrap(),
            vec![0, 1, 0, 1]
        );
    }
}
