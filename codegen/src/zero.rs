//! Zero-initialization of the part of a result an operation does not write.

use logemm_ir::{BoundingBox, DenseLayout, IndexedTensorDescription, Indices, LoopRanges, Range};
use snafu::OptionExt;

use crate::error::*;
use crate::session::EmitContext;

/// Box of `result` entries an operation writes, given a range for every index.
pub fn write_box(result: &IndexedTensorDescription, ranges: &LoopRanges) -> Result<BoundingBox> {
    match BoundingBox::from_loop_ranges(&result.indices, ranges) {
        Some(bbox) => Ok(bbox),
        None => {
            let index = result.indices.names().find(|name| !ranges.contains_key(name)).unwrap_or_default();
            MissingLoopRangeSnafu { index }.fail()
        }
    }
}

/// Result entries an operation writes.
///
/// A box with one range per result index, narrowed by fused index groups: a GEMM
/// writes a range of the fused axis, which covers only part of the box its
/// per-index ranges span.
#[derive(Debug, Clone)]
pub struct WriteRegion {
    bbox: BoundingBox,
    fused: Vec<(Indices, Range)>,
}

impl WriteRegion {
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox, fused: Vec::new() }
    }

    /// Keep only entries whose coordinate on the fused axis of `group` lies in `range`.
    pub fn fused(mut self, group: Indices, range: Range) -> Self {
        if group.len() > 1 {
            self.fused.push((group, range));
        }
        self
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn contains(&self, layout: &DenseLayout, indices: &Indices, entry: &[usize]) -> bool {
        self.bbox.contains_entry(entry)
            && self
                .fused
                .iter()
                .all(|(group, range)| range.contains_index(layout.fused_coordinate(entry, indices, group)))
    }
}

/// Split sorted addresses into `(start, count)` runs of consecutive elements.
pub fn contiguous_runs(addresses: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &address in addresses {
        match runs.last_mut() {
            Some((start, count)) if *start + *count == address => *count += 1,
            _ => runs.push((address, 1)),
        }
    }
    runs
}

/// Zero every stored element of `result` outside `written`.
pub fn initialize_with_zero(
    ctx: &mut EmitContext<'_>,
    result: &IndexedTensorDescription,
    written: &WriteRegion,
) -> Result<()> {
    let layout = result
        .layout
        .as_dense()
        .context(CompressedOperandSnafu { name: result.name.clone(), operation: "zero initialization" })?;

    let unwritten = layout.addresses_where(|entry| !written.contains(layout, &result.indices, entry));
    let runs = contiguous_runs(&unwritten);
    tracing::trace!(result = %result.name, runs = runs.len(), "zero-initializing unwritten entries");
    for (start, count) in runs {
        ctx.zero(&result.name, start, count);
    }
    Ok(())
}
