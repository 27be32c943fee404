use smallvec::SmallVec;
use snafu::Snafu;

use crate::Range;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Range with `start > stop`.
    #[snafu(display("invalid range: start {start} is past stop {stop}"))]
    InvalidRange { start: usize, stop: usize },

    /// Index names must be unique within one tensor.
    #[snafu(display("duplicate index '{index}' in {names}"))]
    DuplicateIndex { index: char, names: String },

    /// Index name list and extent list differ in length.
    #[snafu(display("index list '{names}' has {names_len} names but {sizes_len} extents"))]
    IndexArity { names: String, names_len: usize, sizes_len: usize },

    /// Requested index does not exist on the tensor.
    #[snafu(display("index '{index}' is not part of {names}"))]
    UnknownIndex { index: char, names: String },

    /// Shapes of two objects that must agree do not.
    #[snafu(display("shape mismatch: expected {expected:?}, got {actual:?}"))]
    ShapeMismatch { expected: SmallVec<[usize; 4]>, actual: SmallVec<[usize; 4]> },

    /// Reshape changes the number of elements.
    #[snafu(display("reshape size mismatch: input size {input_size} != output size {output_size}"))]
    ReshapeSizeMismatch { input_size: usize, output_size: usize },

    /// Entry lies outside a shape.
    #[snafu(display("entry {entry:?} is outside shape {shape:?}"))]
    EntryOutOfBounds { entry: SmallVec<[usize; 4]>, shape: SmallVec<[usize; 4]> },

    /// Bounding box does not fit into the allocated shape.
    #[snafu(display("bounding box axis {axis} range {range} exceeds extent {extent}"))]
    BoundingBoxOutOfShape { axis: usize, range: Range, extent: usize },

    /// Compressed layouts are two-dimensional.
    #[snafu(display("compressed sparse column layout requires rank 2, got rank {rank}"))]
    CscRank { rank: usize },

    /// Two index groups cannot be fused into a matrix view.
    #[snafu(display("cannot fuse index groups {rows} and {cols} of {names}: {reason}"))]
    Unfold { rows: String, cols: String, names: String, reason: String },
}
