//! Structural-nonzero patterns.
//!
//! A pattern marks which entries of a tensor may be nonzero. Storage is column-major
//! (first axis fastest), matching the memory layouts the patterns describe, so a
//! reshape never moves data.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::{BoundingBox, Range};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SparsityPattern {
    shape: SmallVec<[usize; 4]>,
    data: Vec<bool>,
}

impl SparsityPattern {
    /// Every entry may be nonzero.
    pub fn dense(shape: &[usize]) -> Self {
        Self { shape: shape.into(), data: vec![true; shape.iter().product()] }
    }

    /// No entry is nonzero.
    pub fn zeros(shape: &[usize]) -> Self {
        Self { shape: shape.into(), data: vec![false; shape.iter().product()] }
    }

    /// Pattern with exactly the given entries set.
    pub fn from_nonzeros<E: AsRef<[usize]>>(shape: &[usize], entries: impl IntoIterator<Item = E>) -> Result<Self> {
        let mut pattern = Self::zeros(shape);
        for entry in entries {
            pattern.set(entry.as_ref(), true)?;
        }
        Ok(pattern)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn linear(&self, entry: &[usize]) -> Result<usize> {
        ensure!(
            entry.len() == self.rank() && entry.iter().zip(&self.shape).all(|(e, s)| e < s),
            EntryOutOfBoundsSnafu { entry: SmallVec::from(entry), shape: self.shape.clone() }
        );
        let mut linear = 0;
        let mut mult = 1;
        for (e, s) in entry.iter().zip(&self.shape) {
            linear += e * mult;
            mult *= s;
        }
        Ok(linear)
    }

    fn unravel(&self, mut linear: usize) -> SmallVec<[usize; 4]> {
        self.shape
            .iter()
            .map(|&s| {
                let e = linear % s;
                linear /= s;
                e
            })
            .collect()
    }

    pub fn get(&self, entry: &[usize]) -> Result<bool> {
        Ok(self.data[self.linear(entry)?])
    }

    pub fn set(&mut self, entry: &[usize], value: bool) -> Result<()> {
        let linear = self.linear(entry)?;
        self.data[linear] = value;
        Ok(())
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Nonzero entries in column-major order.
    pub fn nonzeros(&self) -> impl Iterator<Item = SmallVec<[usize; 4]>> + '_ {
        self.data.iter().enumerate().filter(|(_, v)| **v).map(|(linear, _)| self.unravel(linear))
    }

    /// Tightest box around the nonzeros. An axis without nonzeros gets `[0, 0)`.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut lo: SmallVec<[usize; 4]> = SmallVec::from_elem(usize::MAX, self.rank());
        let mut hi: SmallVec<[usize; 4]> = SmallVec::from_elem(0, self.rank());
        for entry in self.nonzeros() {
            for (axis, &e) in entry.iter().enumerate() {
                lo[axis] = lo[axis].min(e);
                hi[axis] = hi[axis].max(e + 1);
            }
        }
        BoundingBox::new(lo.into_iter().zip(hi).map(|(lo, hi)| if lo > hi { Range::empty() } else { Range::new(lo, hi) }))
    }

    /// OR-reduce over every axis not listed in `kept`.
    ///
    /// `kept` holds axis positions in increasing order; the result has one axis per
    /// kept position, in that order. Keeping no axis yields a single-element pattern
    /// that is set iff any entry is.
    pub fn reduce(&self, kept: &[usize]) -> SparsityPattern {
        debug_assert!(kept.windows(2).all(|w| w[0] < w[1]), "kept axes must be sorted");
        let shape: SmallVec<[usize; 4]> = kept.iter().map(|&axis| self.shape[axis]).collect();
        let mut reduced = if shape.is_empty() { Self::zeros(&[1]) } else { Self::zeros(&shape) };
        for entry in self.nonzeros() {
            let projected: SmallVec<[usize; 4]> =
                if shape.is_empty() { SmallVec::from_elem(0, 1) } else { kept.iter().map(|&axis| entry[axis]).collect() };
            // Entries stem from our own shape, so the projection is in bounds.
            if let Ok(linear) = reduced.linear(&projected) {
                reduced.data[linear] = true;
            }
        }
        reduced
    }

    /// Reinterpret the column-major storage under a new shape.
    pub fn reshape(&self, shape: &[usize]) -> Result<SparsityPattern> {
        let output_size: usize = shape.iter().product();
        ensure!(output_size == self.len(), ReshapeSizeMismatchSnafu { input_size: self.len(), output_size });
        Ok(Self { shape: shape.into(), data: self.data.clone() })
    }
}
