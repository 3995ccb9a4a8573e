//! Graded domains: fiber layouts over the chains of a nerve.
//!
//! For each degree `d`, the fibers `F(tip c)` of the chains `c ∈ N[d]` are
//! concatenated in chain order into one flat buffer:
//!
//! ```text
//! begin[d][0] = 0
//! begin[d][i + 1] = begin[d][i] + sizes[d][i]
//! flat(c, x) = begin[d][idx(c)] + F(tip c).index(x)
//! ```
//!
//! A domain also owns the restriction tables of its functor and the
//! operator cache; both fill lazily and are never invalidated.

mod field;

pub use field::Field;

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use nalgebra::DVector;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use crate::error::{NerveError, Result};
use crate::functor::Functor;
use crate::id::{tip, Chain, ChainId, Degree, RegionId};
use crate::linear::{LinearMap, Triplets};
use crate::nerve::Nerve;
use crate::operators::cache::{OperatorCache, OperatorKind};
use crate::region::Region;
use crate::shape::Shape;

/// Fiber sizes and offsets of one degree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiberLayout {
    sizes: Vec<usize>,
    begin: Vec<usize>,
    end: Vec<usize>,
    total: usize,
}

impl FiberLayout {
    fn new(sizes: Vec<usize>) -> Self {
        let mut begin = Vec::with_capacity(sizes.len());
        let mut end = Vec::with_capacity(sizes.len());
        let mut total = 0;
        for &n in &sizes {
            begin.push(total);
            total += n;
            end.push(total);
        }
        Self {
            sizes,
            begin,
            end,
            total,
        }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn begin(&self) -> &[usize] {
        &self.begin
    }

    pub fn end(&self) -> &[usize] {
        &self.end
    }

    /// Length of the flat buffer
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of chains
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Flat range of the `i`-th fiber.
    pub fn range(&self, i: ChainId) -> Result<std::ops::Range<usize>> {
        match (self.begin.get(i), self.end.get(i)) {
            (Some(&b), Some(&e)) => Ok(b..e),
            _ => Err(NerveError::IndexOutOfRange {
                index: i,
                size: self.sizes.len(),
            }),
        }
    }
}

pub struct GradedDomain {
    nerve: Arc<Nerve>,
    functor: Functor,
    /// `F(a)` for every region
    objects: Vec<Shape>,
    layouts: Vec<FiberLayout>,
    /// Start of each degree in the concatenation of all degrees
    starts: Vec<usize>,
    restrictions: RefCell<HashMap<(RegionId, RegionId), Rc<[usize]>>>,
    pub(crate) cache: OperatorCache,
    scalars: OnceCell<Rc<GradedDomain>>,
}

impl fmt::Debug for GradedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradedDomain")
            .field("functor", &self.functor)
            .field(
                "sizes",
                &self.layouts.iter().map(FiberLayout::total).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl GradedDomain {
    pub fn new(nerve: Arc<Nerve>, functor: Functor) -> Result<Rc<Self>> {
        let objects = nerve
            .regions()
            .iter()
            .map(|region| functor.obj(region))
            .collect::<Result<Vec<_>>>()?;

        let mut layouts = Vec::with_capacity(nerve.depth());
        for d in 0..nerve.depth() {
            let sizes = nerve
                .level(d)?
                .iter()
                .map(|chain| objects[tip(chain)].size())
                .collect();
            layouts.push(FiberLayout::new(sizes));
        }

        let mut starts = Vec::with_capacity(layouts.len());
        let mut total = 0;
        for layout in &layouts {
            starts.push(total);
            total += layout.total();
        }
        debug!(
            regions = objects.len(),
            degrees = layouts.len(),
            total,
            "built graded domain"
        );

        Ok(Rc::new(Self {
            nerve,
            functor,
            objects,
            layouts,
            starts,
            restrictions: RefCell::new(HashMap::new()),
            cache: OperatorCache::default(),
            scalars: OnceCell::new(),
        }))
    }

    pub fn nerve(&self) -> &Arc<Nerve> {
        &self.nerve
    }

    pub fn functor(&self) -> &Functor {
        &self.functor
    }

    /// Number of stored degrees
    pub fn depth(&self) -> usize {
        self.layouts.len()
    }

    pub fn layout(&self, degree: Degree) -> Result<&FiberLayout> {
        self.layouts.get(degree).ok_or(NerveError::MissingDegree {
            operator: "domain",
            degree,
            available: self.layouts.len(),
        })
    }

    /// Length of the degree-d buffer.
    pub fn size(&self, degree: Degree) -> Result<usize> {
        self.layout(degree).map(FiberLayout::total)
    }

    /// Length of all degrees together.
    pub fn total(&self) -> usize {
        self.layouts.iter().map(FiberLayout::total).sum()
    }

    /// `F(a)`
    pub fn object(&self, region: RegionId) -> Result<&Shape> {
        self.objects.get(region).ok_or(NerveError::IndexOutOfRange {
            index: region,
            size: self.objects.len(),
        })
    }

    pub fn region(&self, id: RegionId) -> Result<&Region> {
        self.nerve.region(id).ok_or(NerveError::IndexOutOfRange {
            index: id,
            size: self.objects.len(),
        })
    }

    /// Shape of the fiber of the `i`-th degree-d chain.
    pub fn fiber_shape(&self, degree: Degree, i: ChainId) -> Result<&Shape> {
        self.object(self.nerve.tip_of(degree, i)?)
    }

    /// Same nerve and same fibers: fields of one are fields of the other.
    pub fn same_layout(&self, other: &GradedDomain) -> bool {
        std::ptr::eq(self, other)
            || (Arc::ptr_eq(&self.nerve, &other.nerve) && self.objects == other.objects)
    }

    // ========================================================================
    // INDEXING
    // ========================================================================

    pub fn index(&self, degree: Degree, chain: &[RegionId]) -> Result<ChainId> {
        self.nerve.index_of(degree, chain)
    }

    /// Look up chains given as a flat key buffer, `degree + 1` regions each.
    pub fn index_batch(&self, degree: Degree, keys: &[RegionId]) -> Result<Vec<ChainId>> {
        let width = degree + 1;
        if keys.len() % width != 0 {
            return Err(NerveError::RankMismatch {
                expected: width,
                found: keys.len() % width,
            });
        }
        keys.chunks(width)
            .map(|chain| self.index(degree, chain))
            .collect()
    }

    pub fn coords(&self, degree: Degree, i: ChainId) -> Result<&Chain> {
        self.nerve.chain(degree, i)
    }

    /// Flat index of local coordinate `local` in the fiber of chain `i`.
    pub fn flat_index(&self, degree: Degree, i: ChainId, local: usize) -> Result<usize> {
        let range = self.layout(degree)?.range(i)?;
        if local >= range.len() {
            return Err(NerveError::IndexOutOfRange {
                index: local,
                size: range.len(),
            });
        }
        Ok(range.start + local)
    }

    /// Inverse of [`flat_index`](Self::flat_index): `(chain, local)`.
    pub fn flat_coords(&self, degree: Degree, index: usize) -> Result<(ChainId, usize)> {
        let layout = self.layout(degree)?;
        if index >= layout.total() {
            return Err(NerveError::IndexOutOfRange {
                index,
                size: layout.total(),
            });
        }
        let chain = layout.end.partition_point(|&e| e <= index);
        Ok((chain, index - layout.begin[chain]))
    }

    /// Split an index into the concatenation of all degrees into
    /// `(degree, index within degree)`.
    pub fn locate(&self, index: usize) -> Result<(Degree, usize)> {
        let total = self.total();
        if index >= total {
            return Err(NerveError::IndexOutOfRange { index, size: total });
        }
        let degree = self.starts.partition_point(|&s| s <= index) - 1;
        Ok((degree, index - self.starts[degree]))
    }

    /// Chain key and local coordinate behind an index into the
    /// concatenation of all degrees: `(degree, chain, local)`.
    pub fn chain_at(&self, index: usize) -> Result<(Degree, &Chain, usize)> {
        let (degree, offset) = self.locate(index)?;
        let (i, local) = self.flat_coords(degree, offset)?;
        Ok((degree, self.coords(degree, i)?, local))
    }

    /// Restriction table `F(a) → F(b)`, cached per region pair.
    pub fn restriction(&self, a: RegionId, b: RegionId) -> Result<Rc<[usize]>> {
        if let Some(table) = self.restrictions.borrow().get(&(a, b)) {
            return Ok(Rc::clone(table));
        }
        let table = self.functor.fmap(self.region(a)?, self.region(b)?)?;
        let (source, target) = (self.object(a)?.size(), self.object(b)?.size());
        if table.len() != source {
            return Err(NerveError::ShapeMismatch {
                operator: "restriction",
                degree: 0,
                expected: source,
                found: table.len(),
            });
        }
        if let Some(&bad) = table.iter().find(|&&y| y >= target) {
            return Err(NerveError::IndexOutOfRange {
                index: bad,
                size: target,
            });
        }
        let table: Rc<[usize]> = table.into();
        self.restrictions
            .borrow_mut()
            .insert((a, b), Rc::clone(&table));
        Ok(table)
    }

    // ========================================================================
    // FIELDS
    // ========================================================================

    pub fn field(self: &Rc<Self>, degree: Degree, data: DVector<f64>) -> Result<Field> {
        let expected = self.size(degree)?;
        if data.len() != expected {
            return Err(NerveError::ShapeMismatch {
                operator: "field",
                degree,
                expected,
                found: data.len(),
            });
        }
        Ok(Field::from_parts(Rc::clone(self), degree, data))
    }

    pub fn from_fn(
        self: &Rc<Self>,
        degree: Degree,
        f: impl FnMut(usize) -> f64,
    ) -> Result<Field> {
        let n = self.size(degree)?;
        self.field(degree, DVector::from_iterator(n, (0..n).map(f)))
    }

    pub fn zeros(self: &Rc<Self>, degree: Degree) -> Result<Field> {
        self.from_fn(degree, |_| 0.0)
    }

    pub fn ones(self: &Rc<Self>, degree: Degree) -> Result<Field> {
        self.from_fn(degree, |_| 1.0)
    }

    /// `0, 1, 2, …` in flat order.
    pub fn range(self: &Rc<Self>, degree: Degree) -> Result<Field> {
        self.from_fn(degree, |i| i as f64)
    }

    /// Standard normal coefficients.
    pub fn randn<R: Rng + ?Sized>(self: &Rc<Self>, degree: Degree, rng: &mut R) -> Result<Field> {
        self.from_fn(degree, |_| {
            let x: f64 = StandardNormal.sample(rng);
            x
        })
    }

    // ========================================================================
    // SCALAR DOMAIN
    // ========================================================================

    /// The trivial-functor domain on the same nerve.
    pub fn scalars(self: &Rc<Self>) -> Result<Rc<GradedDomain>> {
        if self.functor.is_trivial() {
            return Ok(Rc::clone(self));
        }
        if let Some(scalars) = self.scalars.get() {
            return Ok(Rc::clone(scalars));
        }
        let scalars = GradedDomain::new(Arc::clone(&self.nerve), Functor::Trivial)?;
        let _ = self.scalars.set(Rc::clone(&scalars));
        Ok(scalars)
    }

    /// Sum over each fiber: degree-d fields to degree-d scalars.
    pub fn to_scalars(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        let scalars = self.scalars()?;
        let matrix = self.cache.get_or_build(OperatorKind::ToScalars, degree, || {
            self.fiber_weights(degree, |_| 1.0)
        })?;
        LinearMap::new("to_scalars", Rc::clone(self), degree, scalars, degree, matrix)
    }

    /// Broadcast each scalar over its fiber.
    pub fn from_scalars(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        Ok(self.to_scalars(degree)?.transpose().named("from_scalars"))
    }

    /// Average over each fiber.
    pub fn means(self: &Rc<Self>, degree: Degree) -> Result<LinearMap> {
        let scalars = self.scalars()?;
        let matrix = self.cache.get_or_build(OperatorKind::Means, degree, || {
            self.fiber_weights(degree, |n| 1.0 / n as f64)
        })?;
        LinearMap::new("means", Rc::clone(self), degree, scalars, degree, matrix)
    }

    fn fiber_weights(
        &self,
        degree: Degree,
        weight: impl Fn(usize) -> f64,
    ) -> Result<nalgebra_sparse::CsrMatrix<f64>> {
        let layout = self.layout(degree)?;
        let mut triplets = Triplets::with_capacity(layout.total());
        for (i, &n) in layout.sizes.iter().enumerate() {
            for col in layout.begin[i]..layout.end[i] {
                triplets.push(i, col, weight(n));
            }
        }
        triplets.into_csr(layout.len(), layout.total())
    }
}
