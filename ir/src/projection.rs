//! Projection of N-D operands onto 2-D GEMM operands.
//!
//! A contraction hands each operand two index groups: the indices that become matrix
//! rows and those that become matrix columns. Every other index of the operand is a
//! loop index handled by pointer re-basing, so the projection simply ignores it.

use crate::error::*;
use crate::{DenseLayout, Indices, IndexedTensorDescription, LoopRanges, MemoryLayout, Range, SparsityPattern};

/// Collapse `term` onto a `rows` x `cols` matrix layout.
///
/// - both groups empty: a 1x1 scalar layout;
/// - one group empty: the other group fused into a vector, padded with a unit axis;
/// - rank-2 operand: its layout unchanged;
/// - otherwise each group fused into one axis.
pub fn project(term: &IndexedTensorDescription, rows: &Indices, cols: &Indices) -> Result<MemoryLayout> {
    let unfold_err = |reason: &str| UnfoldSnafu {
        rows: rows.to_string(),
        cols: cols.to_string(),
        names: term.indices.to_string(),
        reason: reason.to_string(),
    };

    if rows.is_empty() && cols.is_empty() {
        return Ok(DenseLayout::new(&[1, 1]).into());
    }
    if rows.is_empty() || cols.is_empty() {
        let Some(dense) = term.layout.as_dense() else {
            return unfold_err("compressed layouts cannot be reinterpreted as vectors").fail();
        };
        let group = if rows.is_empty() { cols } else { rows };
        let vector = dense.vec(&term.indices, group)?;
        return Ok(vector.with_dummy_dimension(rows.is_empty()).into());
    }
    if term.indices.len() == 2 {
        return Ok(term.layout.clone());
    }
    match &term.layout {
        MemoryLayout::Dense(dense) => Ok(dense.unfold(&term.indices, rows, cols)?.into()),
        MemoryLayout::Csc(_) => unfold_err("compressed layouts are two-dimensional").fail(),
    }
}

/// Propagate the structural-nonzero pattern through a projection.
///
/// Axes of `term` not in `kept` are OR-reduced away, the rest is reshaped to the
/// projected layout.
pub fn reduce_pattern(term: &IndexedTensorDescription, kept: &Indices, layout: &MemoryLayout) -> Result<SparsityPattern> {
    let positions = term.indices.positions(kept);
    term.pattern.reduce(&positions).reshape(layout.shape())
}

/// Map a range on the fused axis of `group` back to per-index ranges.
pub fn defuse(fused: Range, term: &IndexedTensorDescription, group: &Indices) -> Result<LoopRanges> {
    match group.len() {
        0 => Ok(LoopRanges::new()),
        1 => Ok(group.names().map(|name| (name, fused)).collect()),
        _ => match &term.layout {
            MemoryLayout::Dense(dense) => Ok(dense.defuse(fused, &term.indices, group)),
            MemoryLayout::Csc(_) => UnfoldSnafu {
                rows: group.to_string(),
                cols: "",
                names: term.indices.to_string(),
                reason: "compressed layouts are two-dimensional",
            }
            .fail(),
        },
    }
}
