//! Tensor shapes and row-major index arithmetic.
//!
//! A shape `(n₁, …, n_k)` indexes the finite product `[n₁] × … × [n_k]`.
//! Coordinates are flattened row-major: the last axis varies fastest.
//! The empty shape `()` has exactly one coordinate (the empty tuple), so
//! it is the fiber of a scalar.

use crate::error::{NerveError, Result};

/// An ordered sequence of axis lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// The 0-dimensional shape (size 1)
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Axis lengths
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of coordinates, `∏ nᵢ`
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major strides: `stride[k] = ∏_{l>k} n_l`
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.dims.len()];
        for k in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * self.dims[k + 1];
        }
        strides
    }

    /// Flatten a coordinate tuple.
    pub fn index(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.dims.len() {
            return Err(NerveError::RankMismatch {
                expected: self.dims.len(),
                found: coords.len(),
            });
        }
        let mut flat = 0;
        for (&x, &n) in coords.iter().zip(&self.dims) {
            if x >= n {
                return Err(NerveError::IndexOutOfRange { index: x, size: n });
            }
            flat = flat * n + x;
        }
        Ok(flat)
    }

    /// Flatten a batch of coordinate tuples stored contiguously, `rank()`
    /// entries per tuple.
    pub fn index_batch(&self, rows: &[usize]) -> Result<Vec<usize>> {
        let k = self.rank();
        if k == 0 {
            // every row is the empty tuple; there is no way to count them
            return if rows.is_empty() {
                Ok(vec![])
            } else {
                Err(NerveError::RankMismatch {
                    expected: 0,
                    found: rows.len(),
                })
            };
        }
        if rows.len() % k != 0 {
            return Err(NerveError::RankMismatch {
                expected: k,
                found: rows.len() % k,
            });
        }
        rows.chunks(k).map(|row| self.index(row)).collect()
    }

    /// Inverse of [`index`](Self::index).
    pub fn coords(&self, index: usize) -> Result<Vec<usize>> {
        let size = self.size();
        if index >= size {
            return Err(NerveError::IndexOutOfRange { index, size });
        }
        let mut coords = vec![0; self.dims.len()];
        let mut rest = index;
        for k in (0..self.dims.len()).rev() {
            coords[k] = rest % self.dims[k];
            rest /= self.dims[k];
        }
        Ok(coords)
    }

    /// Batched [`coords`](Self::coords); output has `rank()` entries per index.
    pub fn coords_batch(&self, indices: &[usize]) -> Result<Vec<usize>> {
        let mut out = Vec::with_capacity(indices.len() * self.rank());
        for &i in indices {
            out.extend(self.coords(i)?);
        }
        Ok(out)
    }

    /// The subshape `(n_{j₁}, …, n_{j_r})`.
    pub fn select(&self, js: &[usize]) -> Result<Shape> {
        js.iter()
            .map(|&j| {
                self.dims.get(j).copied().ok_or(NerveError::IndexOutOfRange {
                    index: j,
                    size: self.dims.len(),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Shape::new)
    }

    /// Restriction table onto the axes `js`.
    ///
    /// Entry `i` is the flat index in `select(js)` of the projection of
    /// coordinate `coords(i)`; the table has `size()` entries.
    pub fn res(&self, js: &[usize]) -> Result<Vec<usize>> {
        let sub = self.select(js)?;
        let sub_strides = sub.strides();
        let table = self
            .iter()
            .map(|x| {
                js.iter()
                    .zip(&sub_strides)
                    .map(|(&j, &stride)| x[j] * stride)
                    .sum::<usize>()
            })
            .collect();
        Ok(table)
    }

    /// Iterate all coordinates in row-major order.
    pub fn iter(&self) -> ShapeIter {
        ShapeIter::new(&self.dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

// ============================================================================
// ITERATORS
// ============================================================================

/// Iterator over all coordinates of a shape (odometer order)
pub struct ShapeIter {
    dims: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl ShapeIter {
    fn new(dims: &[usize]) -> Self {
        let done = dims.contains(&0);
        Self {
            dims: dims.to_vec(),
            current: vec![0; dims.len()],
            done,
        }
    }
}

impl Iterator for ShapeIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.dims.is_empty() {
            self.done = true;
            return Some(vec![]);
        }

        let result = self.current.clone();

        for i in (0..self.dims.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.dims[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }

        Some(result)
    }
}
