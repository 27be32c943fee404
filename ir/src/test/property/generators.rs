//! Proptest strategies for ranges and shapes.

use proptest::prelude::*;

use crate::Range;

/// Any range inside `[0, bound)`.
pub fn range_within(bound: usize) -> impl Strategy<Value = Range> {
    (0..=bound, 0..=bound).prop_map(|(a, b)| Range::new(a.min(b), a.max(b)))
}

/// Shape of rank 1 to 3 with small extents.
pub fn small_shape() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..6, 1..=3)
}

/// Two-axis shape together with a non-empty fused range over it.
pub fn fused_range() -> impl Strategy<Value = ((usize, usize), Range)> {
    (1usize..7, 1usize..7).prop_flat_map(|(a, b)| {
        let total = a * b;
        (Just((a, b)), (0..total, 1..=total)).prop_map(move |(shape, (start, len))| {
            let stop = (start + len).min(total);
            (shape, Range::new(start, stop))
        })
    })
}
