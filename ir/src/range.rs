//! Half-open integer intervals.

use std::fmt;
use std::ops::BitAnd;

use snafu::ensure;

use crate::error::*;

/// Half-open interval `[start, stop)` over one index extent.
///
/// Invariant: `start <= stop`. Intersections of disjoint ranges collapse to an empty
/// range anchored at the larger start instead of producing an inverted interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    pub start: usize,
    pub stop: usize,
}

impl Range {
    /// Create a range, panicking on `start > stop`.
    ///
    /// Use [`Range::try_new`] for untrusted bounds.
    pub const fn new(start: usize, stop: usize) -> Self {
        assert!(start <= stop, "range start past stop");
        Self { start, stop }
    }

    pub fn try_new(start: usize, stop: usize) -> Result<Self> {
        ensure!(start <= stop, InvalidRangeSnafu { start, stop });
        Ok(Self { start, stop })
    }

    /// Empty range anchored at zero.
    pub const fn empty() -> Self {
        Self { start: 0, stop: 0 }
    }

    pub const fn size(&self) -> usize {
        self.stop - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained in any range.
    pub const fn contains(&self, other: &Range) -> bool {
        other.is_empty() || (self.start <= other.start && other.stop <= self.stop)
    }

    pub const fn contains_index(&self, index: usize) -> bool {
        self.start <= index && index < self.stop
    }

    /// Round `start` down and `stop` up to multiples of `alignment` (in elements).
    pub const fn aligned(&self, alignment: usize) -> Self {
        if alignment <= 1 {
            return *self;
        }
        let start = self.start - self.start % alignment;
        let stop = self.stop + (alignment - self.stop % alignment) % alignment;
        Self { start, stop }
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.stop
    }
}

impl BitAnd for Range {
    type Output = Range;

    fn bitand(self, rhs: Range) -> Range {
        let start = self.start.max(rhs.start);
        let stop = self.stop.min(rhs.stop).max(start);
        Range { start, stop }
    }
}

impl TryFrom<std::ops::Range<usize>> for Range {
    type Error = Error;

    fn try_from(r: std::ops::Range<usize>) -> Result<Self> {
        Range::try_new(r.start, r.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.stop)
    }
}
