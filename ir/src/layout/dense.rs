//! Dense column-major layouts.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::indices::loop_variable;
use crate::{BoundingBox, Indices, LoopRanges, Range};

/// Dense strided layout addressed relative to the start of its bounding box.
///
/// Strides are in elements. Unless given explicitly they are column-major over the
/// bounding-box extents, so only the box is allocated, not the full shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DenseLayout {
    shape: SmallVec<[usize; 4]>,
    bbox: BoundingBox,
    stride: SmallVec<[usize; 4]>,
}

/// One fused axis: extent, box range and stride.
struct FusedAxis {
    extent: usize,
    range: Range,
    stride: usize,
}

impl DenseLayout {
    /// Layout covering the full shape.
    pub fn new(shape: &[usize]) -> Self {
        let bbox = BoundingBox::from_shape(shape);
        let stride = column_major_strides(&bbox);
        Self { shape: shape.into(), bbox, stride }
    }

    /// Layout storing only `bbox`, which must fit inside `shape`.
    pub fn with_bounding_box(shape: &[usize], bbox: BoundingBox) -> Result<Self> {
        check_box(shape, &bbox)?;
        let stride = column_major_strides(&bbox);
        Ok(Self { shape: shape.into(), bbox, stride })
    }

    /// Layout with explicit strides.
    pub fn with_strides(shape: &[usize], bbox: BoundingBox, stride: &[usize]) -> Result<Self> {
        check_box(shape, &bbox)?;
        ensure!(
            stride.len() == shape.len(),
            ShapeMismatchSnafu { expected: SmallVec::from(shape), actual: SmallVec::from(stride) }
        );
        Ok(Self { shape: shape.into(), bbox, stride: stride.into() })
    }

    /// Widen the first axis of the box to `alignment` elements and recompute strides.
    ///
    /// The widened box may reach past the shape; the padding is allocated but never
    /// addressed by a loop.
    pub fn align_stride(mut self, alignment: usize) -> Self {
        if self.rank() > 0 {
            let aligned = self.bbox[0].aligned(alignment);
            self.bbox.set(0, aligned);
            self.stride = column_major_strides(&self.bbox);
        }
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn strides(&self) -> &[usize] {
        &self.stride
    }

    pub fn stride(&self, axis: usize) -> usize {
        self.stride[axis]
    }

    /// Number of elements the layout occupies.
    pub fn required_reals(&self) -> usize {
        match (self.bbox.ranges().last(), self.stride.last()) {
            (Some(range), Some(stride)) => range.size() * stride,
            _ => 1,
        }
    }

    /// Element offset of `entry` relative to the layout's base pointer.
    pub fn address(&self, entry: &[usize]) -> Result<usize> {
        ensure!(
            self.bbox.contains_entry(entry),
            EntryOutOfBoundsSnafu { entry: SmallVec::from(entry), shape: self.shape.clone() }
        );
        Ok(entry.iter().zip(self.bbox.iter()).zip(&self.stride).map(|((e, r), s)| (e - r.start) * s).sum())
    }

    /// Window of ranges lies inside the stored box.
    pub fn contains_window(&self, window: &[Range]) -> bool {
        window.len() == self.rank() && self.bbox.iter().zip(window).all(|(b, w)| b.contains(w))
    }

    /// C expression for the offset contributed by the loop variables in `subset`.
    ///
    /// Loop variables run over absolute index values, so the box start is subtracted.
    pub fn address_string(&self, indices: &Indices, subset: &Indices) -> String {
        let terms: Vec<String> = indices
            .positions(subset)
            .into_iter()
            .map(|p| {
                let var = loop_variable(indices.name_at(p));
                let start = self.bbox[p].start;
                if start == 0 { format!("{}*{var}", self.stride[p]) } else { format!("{}*({var}-{start})", self.stride[p]) }
            })
            .collect();
        terms.join(" + ")
    }

    /// Every loop variable in `subset` moves the pointer by a multiple of `alignment`.
    pub fn is_aligned_address_string(&self, indices: &Indices, subset: &Indices, alignment: usize) -> bool {
        indices.positions(subset).into_iter().all(|p| self.stride[p] % alignment.max(1) == 0)
    }

    /// First column starts aligned and the leading dimension preserves alignment.
    pub fn aligned_stride(&self, alignment: usize) -> bool {
        let alignment = alignment.max(1);
        if self.rank() == 0 {
            return true;
        }
        let offset_ok = self.bbox[0].start % alignment == 0;
        let ld_ok = self.stride[0] == 1 && (self.rank() == 1 || self.stride[1] % alignment == 0);
        offset_ok && ld_ok
    }

    fn fuse(&self, indices: &Indices, positions: &[usize]) -> Result<FusedAxis> {
        let names = || positions.iter().map(|&p| indices.name_at(p)).collect::<String>();
        ensure!(
            positions.windows(2).all(|w| w[1] == w[0] + 1),
            UnfoldSnafu { rows: names(), cols: "", names: indices.to_string(), reason: "indices are not adjacent" }
        );

        let mut extent = 1;
        let mut start = 0;
        let mut last = 0;
        let mut empty = false;
        for (i, &p) in positions.iter().enumerate() {
            if let Some(&next) = positions.get(i + 1) {
                debug_assert_eq!(
                    self.stride[next],
                    self.stride[p] * self.shape[p],
                    "fused axes must be contiguous in memory"
                );
            }
            let range = self.bbox[p];
            empty |= range.is_empty();
            start += range.start * extent;
            last += range.stop.saturating_sub(1) * extent;
            extent *= self.shape[p];
        }
        let range = if empty { Range::new(start, start) } else { Range::new(start, last + 1) };
        Ok(FusedAxis { extent, range, stride: self.stride[positions[0]] })
    }

    /// Matrix view fusing `rows` into axis 0 and `cols` into axis 1.
    ///
    /// `rows` must precede `cols` in `indices`. Indices in neither group are left to
    /// pointer arithmetic of the caller.
    pub fn unfold(&self, indices: &Indices, rows: &Indices, cols: &Indices) -> Result<DenseLayout> {
        let pos_rows = indices.positions(rows);
        let pos_cols = indices.positions(cols);
        let err = |reason: &str| UnfoldSnafu {
            rows: rows.to_string(),
            cols: cols.to_string(),
            names: indices.to_string(),
            reason: reason.to_string(),
        };
        ensure!(!pos_rows.is_empty() && !pos_cols.is_empty(), err("empty index group"));
        ensure!(pos_rows[pos_rows.len() - 1] < pos_cols[0], err("row indices must precede column indices"));

        let r = self.fuse(indices, &pos_rows)?;
        let c = self.fuse(indices, &pos_cols)?;
        Ok(DenseLayout {
            shape: SmallVec::from_slice(&[r.extent, c.extent]),
            bbox: BoundingBox::new([r.range, c.range]),
            stride: SmallVec::from_slice(&[r.stride, c.stride]),
        })
    }

    /// Vector view fusing `group` into a single axis.
    pub fn vec(&self, indices: &Indices, group: &Indices) -> Result<DenseLayout> {
        let positions = indices.positions(group);
        ensure!(
            !positions.is_empty(),
            UnfoldSnafu { rows: group.to_string(), cols: "", names: indices.to_string(), reason: "empty index group" }
        );
        let axis = self.fuse(indices, &positions)?;
        Ok(DenseLayout {
            shape: SmallVec::from_slice(&[axis.extent]),
            bbox: BoundingBox::new([axis.range]),
            stride: SmallVec::from_slice(&[axis.stride]),
        })
    }

    /// Append (or prepend) a unit axis to a vector layout.
    pub fn with_dummy_dimension(&self, leading: bool) -> DenseLayout {
        debug_assert_eq!(self.rank(), 1);
        let extent = self.shape[0];
        let range = self.bbox[0];
        let stride = self.stride[0];
        if leading {
            DenseLayout {
                shape: SmallVec::from_slice(&[1, extent]),
                bbox: BoundingBox::new([Range::new(0, 1), range]),
                stride: SmallVec::from_slice(&[1, stride]),
            }
        } else {
            DenseLayout {
                shape: SmallVec::from_slice(&[extent, 1]),
                bbox: BoundingBox::new([range, Range::new(0, 1)]),
                stride: SmallVec::from_slice(&[stride, stride * range.size().max(1)]),
            }
        }
    }

    /// Map a range on the fused axis of `group` back to one range per index.
    ///
    /// The result is the tightest per-index box containing every fused coordinate of
    /// `fused`: once a more significant index spans several values, all less
    /// significant indices cover their full extent.
    pub fn defuse(&self, fused: Range, indices: &Indices, group: &Indices) -> LoopRanges {
        let positions = indices.positions(group);
        let mut ranges = LoopRanges::new();
        if fused.is_empty() {
            ranges.extend(positions.iter().map(|&p| (indices.name_at(p), Range::empty())));
            return ranges;
        }

        let mut mults: SmallVec<[usize; 4]> = SmallVec::with_capacity(positions.len());
        let mut mult = 1;
        for &p in &positions {
            mults.push(mult);
            mult *= self.shape[p];
        }

        let mut start = fused.start;
        let mut last = fused.stop - 1;
        let mut full = false;
        for (&p, &m) in positions.iter().zip(&mults).rev() {
            let name = indices.name_at(p);
            if full {
                ranges.insert(name, Range::new(0, self.shape[p]));
                continue;
            }
            let (lo, hi) = (start / m, last / m);
            ranges.insert(name, Range::new(lo, hi + 1));
            if lo != hi {
                full = true;
            }
            start %= m;
            last %= m;
        }
        ranges
    }

    /// Sorted addresses inside the stored box whose entries lie outside `written`.
    pub fn not_written_addresses(&self, written: &BoundingBox) -> Vec<usize> {
        self.addresses_where(|entry| !written.contains_entry(entry))
    }

    /// Sorted addresses of the stored entries accepted by `filter`.
    pub fn addresses_where(&self, filter: impl Fn(&[usize]) -> bool) -> Vec<usize> {
        let mut addresses: Vec<usize> = self
            .bbox
            .entries()
            .into_iter()
            .filter(|entry| filter(entry))
            .filter_map(|entry| self.address(&entry).ok())
            .collect();
        addresses.sort_unstable();
        addresses
    }

    /// Coordinate of `entry` on the axis that fuses `group`, first index least significant.
    pub fn fused_coordinate(&self, entry: &[usize], indices: &Indices, group: &Indices) -> usize {
        let mut mult = 1;
        let mut coordinate = 0;
        for p in indices.positions(group) {
            coordinate += entry[p] * mult;
            mult *= self.shape[p];
        }
        coordinate
    }
}

fn column_major_strides(bbox: &BoundingBox) -> SmallVec<[usize; 4]> {
    let mut stride = SmallVec::with_capacity(bbox.rank());
    let mut acc = 1;
    for range in bbox.iter() {
        stride.push(acc);
        acc *= range.size();
    }
    stride
}

fn check_box(shape: &[usize], bbox: &BoundingBox) -> Result<()> {
    ensure!(
        bbox.rank() == shape.len(),
        ShapeMismatchSnafu {
            expected: SmallVec::<[usize; 4]>::from(shape),
            actual: bbox.iter().map(Range::size).collect::<SmallVec<[usize; 4]>>()
        }
    );
    for (axis, (range, &extent)) in bbox.iter().zip(shape).enumerate() {
        ensure!(range.stop <= extent, BoundingBoxOutOfShapeSnafu { axis, range: *range, extent });
    }
    Ok(())
}
