//! Per-axis bounding boxes.

use std::fmt;
use std::ops::Index;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::{LoopRanges, Range, SparsityPattern};
use crate::indices::Indices;

/// Ordered tuple of ranges, one per tensor axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
    ranges: SmallVec<[Range; 4]>,
}

impl BoundingBox {
    pub fn new(ranges: impl IntoIterator<Item = Range>) -> Self {
        Self { ranges: ranges.into_iter().collect() }
    }

    /// Box covering an allocated shape completely.
    pub fn from_shape(shape: &[usize]) -> Self {
        Self::new(shape.iter().map(|&extent| Range::new(0, extent)))
    }

    /// Tightest box enclosing all nonzero entries of a pattern.
    pub fn from_pattern(pattern: &SparsityPattern) -> Self {
        pattern.bounding_box()
    }

    /// Collect the ranges of `indices` from a loop-range map, in index order.
    ///
    /// Returns `None` if an index has no range.
    pub fn from_loop_ranges(indices: &Indices, ranges: &LoopRanges) -> Option<Self> {
        indices.names().map(|name| ranges.get(&name).copied()).collect::<Option<SmallVec<_>>>().map(|ranges| Self { ranges })
    }

    pub fn rank(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.ranges.iter()
    }

    /// Number of entries inside the box.
    pub fn size(&self) -> usize {
        self.ranges.iter().map(Range::size).product()
    }

    /// `other` has the same rank and each axis is contained in ours.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.rank() == other.rank() && self.ranges.iter().zip(&other.ranges).all(|(a, b)| a.contains(b))
    }

    /// Entry lies inside the box.
    pub fn contains_entry(&self, entry: &[usize]) -> bool {
        entry.len() == self.rank() && self.ranges.iter().zip(entry).all(|(r, &e)| r.contains_index(e))
    }

    /// Axis-wise intersection. Ranks must agree.
    pub fn intersection(&self, other: &BoundingBox) -> BoundingBox {
        debug_assert_eq!(self.rank(), other.rank());
        Self::new(self.ranges.iter().zip(&other.ranges).map(|(a, b)| *a & *b))
    }

    /// All entries inside the box, first axis fastest.
    ///
    /// A rank-0 box has exactly one (empty) entry.
    pub fn entries(&self) -> Vec<SmallVec<[usize; 4]>> {
        if self.ranges.iter().any(Range::is_empty) {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.size());
        let mut current: SmallVec<[usize; 4]> = self.ranges.iter().map(|r| r.start).collect();
        loop {
            out.push(current.clone());
            let mut axis = 0;
            loop {
                if axis == current.len() {
                    return out;
                }
                current[axis] += 1;
                if current[axis] < self.ranges[axis].stop {
                    break;
                }
                current[axis] = self.ranges[axis].start;
                axis += 1;
            }
        }
    }

    pub(crate) fn set(&mut self, axis: usize, range: Range) {
        self.ranges[axis] = range;
    }
}

impl Index<usize> for BoundingBox {
    type Output = Range;

    fn index(&self, axis: usize) -> &Range {
        &self.ranges[axis]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.ranges.iter().join(", "))
    }
}
