//! Build and integration parameters.
//!
//! Plain serde-derivable records with defaults. They are consumed by
//! [`Hypergraph::nerve`](crate::hypergraph::Hypergraph::nerve) and by the
//! diffusion engine; nothing in the crate reads configuration from the
//! environment.

use serde::{Deserialize, Serialize};

use crate::error::{NerveError, Result};
use crate::id::Degree;

/// Parameters for intersection closure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureConfig {
    /// Keep the empty region when two regions are disjoint.
    pub include_empty: bool,
}

/// Parameters for nerve construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerveConfig {
    /// Close the hypergraph under intersection before building chains.
    pub close: bool,
    pub closure: ClosureConfig,
    /// Highest chain degree to build. Required for cyclic orders.
    pub max_degree: Option<Degree>,
}

impl Default for NerveConfig {
    fn default() -> Self {
        Self {
            close: true,
            closure: ClosureConfig::default(),
            max_degree: None,
        }
    }
}

impl NerveConfig {
    pub fn with_max_degree(mut self, max_degree: Degree) -> Self {
        self.max_degree = Some(max_degree);
        self
    }

    pub fn with_empty_region(mut self) -> Self {
        self.closure.include_empty = true;
        self
    }

    pub fn without_closure(mut self) -> Self {
        self.close = false;
        self
    }
}

/// Which vector field drives the diffusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffusionKind {
    /// `−(δ D_β(H) + broadcast(F(H)))`
    #[default]
    Gbp,
    /// `−(δ D_β(H) + μ(broadcast(F_Bethe(H))))`. Same centred velocity as
    /// [`Gbp`](Self::Gbp), but the fiber constants are never renormalised
    /// and grow without bound.
    GbpMobius,
    /// `−((ζ∘δ∘μ) D_β(H) + F_Bethe(H))`
    Bethe,
}

/// Parameters for a diffusion run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffusionConfig {
    /// Inverse temperature β > 0
    pub beta: f64,
    /// Euler step size
    pub dt: f64,
    /// Number of Euler steps
    pub steps: usize,
    pub kind: DiffusionKind,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            beta: 1.0,
            dt: 0.1,
            steps: 10,
            kind: DiffusionKind::Gbp,
        }
    }
}

impl DiffusionConfig {
    pub fn validate(&self) -> Result<()> {
        check_beta(self.beta)?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(NerveError::InvalidConfig(format!(
                "step size must be positive and finite, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_beta(beta: f64) -> Result<()> {
    if beta.is_finite() && beta > 0.0 {
        Ok(())
    } else {
        Err(NerveError::InvalidConfig(format!(
            "inverse temperature must be positive and finite, got {}",
            beta
        )))
    }
}
