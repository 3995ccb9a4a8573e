//! ID types for hypernerve
//!
//! Different layers index the same objects at different granularities:
//! - Atoms: caller-chosen vertex labels (arbitrary, possibly sparse)
//! - RegionIds: ordinals of regions in a poset (dense, 0..N₀, canonical order)
//! - ChainIds: ordinals of chains within `N[d]` (dense, 0..N_d)
//!
//! A chain is stored as the tuple of its RegionIds, largest region first.

/// A vertex label. Regions are sets of atoms.
pub type Atom = usize;

/// Index of a region within a poset (and within `N[0]` of its nerve).
pub type RegionId = usize;

/// Index of a chain within the degree-d level of a nerve.
pub type ChainId = usize;

/// Degree of a chain: a degree-d chain has d+1 regions.
pub type Degree = usize;

/// A strictly decreasing sequence of regions `a0 > a1 > … > ad`.
pub type Chain = Vec<RegionId>;

/// The smallest region of a chain.
///
/// Chains are never empty; every constructor in this crate guarantees at
/// least one region.
#[inline]
pub fn tip(chain: &[RegionId]) -> RegionId {
    chain[chain.len() - 1]
}

/// Degree of a chain (number of strict inclusions).
#[inline]
pub fn degree_of(chain: &[RegionId]) -> Degree {
    chain.len().saturating_sub(1)
}

/// Convert a RegionId to the u32 key used by roaring bitmaps.
#[inline]
pub(crate) fn region_key(id: RegionId) -> u32 {
    debug_assert!(id <= u32::MAX as usize, "region id exceeds bitmap range");
    id as u32
}
