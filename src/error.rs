//! Error type for nerve construction, operators and diffusion
//!
//! Every failure aborts the current call. Variants carry the operator name
//! and degree when one is involved so callers can report precisely what
//! went wrong. Non-finite values produced by `exp`/`log` are not errors;
//! they propagate through fields unchanged.

use thiserror::Error;

use crate::id::{Atom, Degree};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NerveError {
    /// A region or chain key that is absent from the domain
    #[error("unknown chain {key:?} in degree {degree}")]
    InvalidKey { degree: Degree, key: Vec<usize> },

    /// A region given by its atoms that is absent from the poset
    #[error("unknown region {0:?}")]
    UnknownRegion(Vec<Atom>),

    /// A field or matrix whose length does not match the domain
    #[error("{operator}: expected {expected} coefficients in degree {degree}, found {found}")]
    ShapeMismatch {
        operator: &'static str,
        degree: Degree,
        expected: usize,
        found: usize,
    },

    /// Coordinates with the wrong number of axes
    #[error("expected {expected} coordinates, found {found}")]
    RankMismatch { expected: usize, found: usize },

    /// Flat index or coordinate past the end of its range
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Chain extension on a cyclic order without a degree cap
    #[error("nerve construction does not terminate: the strict order is cyclic and no maximal degree was given (cycle through region {region})")]
    NonTerminating { region: usize },

    /// Möbius series whose terms do not vanish within the chain-length bound
    #[error("{operator}: Neumann series did not vanish in degree {degree} after {terms} terms")]
    DegenerateOperator {
        operator: &'static str,
        degree: Degree,
        terms: usize,
    },

    /// A degree that the nerve does not store
    #[error("{operator}: degree {degree} is not available (nerve stores degrees 0..{available})")]
    MissingDegree {
        operator: &'static str,
        degree: Degree,
        available: usize,
    },

    /// Operands living on different graded domains or degrees
    #[error("{operator}: operands live on different domains or degrees")]
    DomainMismatch { operator: &'static str },

    /// A restriction requested between regions that are not included
    #[error("no restriction from {from:?} to {to:?}: target is not a subset")]
    NotIncluded { from: Vec<Atom>, to: Vec<Atom> },

    /// An atom without a registered shape
    #[error("atom {0} has no shape")]
    UnknownAtom(Atom),

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by the sparse backend while assembling a matrix
    #[error("sparse assembly failed: {0}")]
    SparseFormat(String),
}

pub type Result<T> = std::result::Result<T, NerveError>;
