//! Regions: finite sets of atoms.
//!
//! A region is stored as a sorted, duplicate-free vector of atoms so that
//! structural equality and hashing coincide with set equality. Inclusion
//! and intersection are linear merges over the sorted vectors.

use std::cmp::Ordering;
use std::fmt;

use crate::id::Atom;

/// A set of atoms, kept sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region(Vec<Atom>);

impl Region {
    /// Build a region from atoms in any order (duplicates are dropped).
    pub fn new(atoms: impl IntoIterator<Item = Atom>) -> Self {
        let mut atoms: Vec<Atom> = atoms.into_iter().collect();
        atoms.sort_unstable();
        atoms.dedup();
        Self(atoms)
    }

    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, atom: Atom) -> bool {
        self.0.binary_search(&atom).is_ok()
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &Region) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let mut rest = other.0.iter();
        'outer: for a in &self.0 {
            for b in rest.by_ref() {
                match b.cmp(a) {
                    Ordering::Less => continue,
                    Ordering::Equal => continue 'outer,
                    Ordering::Greater => return false,
                }
            }
            return false;
        }
        true
    }

    /// `self ⊊ other`
    pub fn is_strict_subset(&self, other: &Region) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    pub fn intersection(&self, other: &Region) -> Region {
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::with_capacity(self.len().min(other.len()));
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Region(out)
    }

    /// Position of each atom of `self` inside `other`, or `None` if
    /// `self ⊄ other`.
    ///
    /// These are the axes selected by the free functor's restriction
    /// `F(other) → F(self)`.
    pub fn positions_in(&self, other: &Region) -> Option<Vec<usize>> {
        self.0
            .iter()
            .map(|a| other.0.binary_search(a).ok())
            .collect()
    }

    /// Canonical order: larger regions first, then lexicographic on atoms.
    pub fn canonical_cmp(&self, other: &Region) -> Ordering {
        other.len().cmp(&self.len()).then_with(|| self.0.cmp(&other.0))
    }
}

impl From<Vec<Atom>> for Region {
    fn from(atoms: Vec<Atom>) -> Self {
        Region::new(atoms)
    }
}

impl From<&[Atom]> for Region {
    fn from(atoms: &[Atom]) -> Self {
        Region::new(atoms.iter().copied())
    }
}

impl<const N: usize> From<[Atom; N]> for Region {
    fn from(atoms: [Atom; N]) -> Self {
        Region::new(atoms)
    }
}

impl FromIterator<Atom> for Region {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Region::new(iter)
    }
}

/// `i:j:k` notation; the empty region prints as `∅`.
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "∅");
        }
        let atoms: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", atoms.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_and_dedups() {
        let r = Region::new(vec![3, 1, 3, 2]);
        assert_eq!(r.atoms(), &[1, 2, 3]);
        assert_eq!(r.len(), 3);
        assert!(r.contains(2));
        assert!(!r.contains(0));
    }

    #[test]
    fn test_subset() {
        let ab = Region::from([0, 1]);
        let abc = Region::from([0, 1, 2]);
        let c = Region::from([2]);
        assert!(ab.is_subset(&abc));
        assert!(ab.is_strict_subset(&abc));
        assert!(!abc.is_subset(&ab));
        assert!(abc.is_subset(&abc));
        assert!(!abc.is_strict_subset(&abc));
        assert!(Region::empty().is_subset(&c));
        assert!(!Region::from([3]).is_subset(&abc));
        assert!(!Region::from([1, 3]).is_subset(&abc));
    }

    #[test]
    fn test_intersection_and_positions() {
        let a = Region::from([0, 2, 5]);
        let b = Region::from([2, 3, 5]);
        assert_eq!(a.intersection(&b), Region::from([2, 5]));
        assert_eq!(Region::from([2, 5]).positions_in(&a), Some(vec![1, 2]));
        assert_eq!(Region::from([3]).positions_in(&a), None);
    }

    #[test]
    fn test_canonical_order() {
        let mut regions = vec![
            Region::from([2]),
            Region::from([0, 1]),
            Region::from([0]),
            Region::from([0, 1, 2]),
            Region::from([1, 2]),
        ];
        regions.sort_by(Region::canonical_cmp);
        assert_eq!(
            regions,
            vec![
                Region::from([0, 1, 2]),
                Region::from([0, 1]),
                Region::from([1, 2]),
                Region::from([0]),
                Region::from([2]),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Region::from([0, 1]).to_string(), "0:1");
        assert_eq!(Region::empty().to_string(), "∅");
    }
}
