//! hypernerve: nerves of hypergraphs with functorial coefficients
//!
//! A hypergraph is closed under intersection and ordered by inclusion; the
//! chains of that order form its nerve. A functor attaches a tensor fiber
//! to every region, and a [`GradedDomain`] lays the fibers of every chain
//! out in flat buffers, one per degree. On top of that layout live the
//! sparse operators of the nerve (face maps, boundary, zeta and Möbius
//! transforms) and belief-propagation style diffusions of local energies.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hypernerve::{diffusion, DiffusionConfig, Functor, GradedDomain, Hypergraph, NerveConfig};
//!
//! # fn main() -> hypernerve::Result<()> {
//! let nerve = Hypergraph::cycle(4).nerve(&NerveConfig::default())?;
//! let domain = GradedDomain::new(Arc::new(nerve), Functor::ising())?;
//! let mut rng = rand::thread_rng();
//! let energy = domain.randn(0, &mut rng)?;
//! let out = diffusion::diffuse(energy, &DiffusionConfig::default())?;
//! println!("{:?}", diffusion::free_energy(&out.state, 1.0)?);
//! # Ok(())
//! # }
//! ```

pub mod conditional;
pub mod config;
pub mod diffusion;
pub mod domain;
pub mod error;
pub mod functor;
pub mod hypergraph;
pub mod id;
pub mod linear;
pub mod nerve;
pub mod operators;
pub mod region;
pub mod shape;

pub use conditional::{ConditionalMap, Conditioner, GibbsSampler};
pub use config::{ClosureConfig, DiffusionConfig, DiffusionKind, NerveConfig};
pub use diffusion::{Euler, Flow, Integration, VectorField};
pub use domain::{FiberLayout, Field, GradedDomain};
pub use error::{NerveError, Result};
pub use functor::{AtomShapes, Functor, FunctorMap};
pub use hypergraph::Hypergraph;
pub use id::{Atom, Chain, ChainId, Degree, RegionId};
pub use linear::{LinearMap, Triplets};
pub use nerve::{Nerve, Poset};
pub use region::Region;
pub use shape::Shape;
