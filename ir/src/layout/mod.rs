//! Memory layouts of tensor operands.

pub mod csc;
pub mod dense;

pub use csc::CscLayout;
pub use dense::DenseLayout;

use crate::error::*;
use crate::{BoundingBox, Range};

/// Storage scheme of an operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemoryLayout {
    Dense(DenseLayout),
    Csc(CscLayout),
}

impl MemoryLayout {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Dense(l) => l.shape(),
            Self::Csc(l) => l.shape(),
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        match self {
            Self::Dense(l) => l.bbox(),
            Self::Csc(l) => l.bbox(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn is_csc(&self) -> bool {
        matches!(self, Self::Csc(_))
    }

    pub fn as_dense(&self) -> Option<&DenseLayout> {
        match self {
            Self::Dense(l) => Some(l),
            Self::Csc(_) => None,
        }
    }

    pub fn as_csc(&self) -> Option<&CscLayout> {
        match self {
            Self::Csc(l) => Some(l),
            Self::Dense(_) => None,
        }
    }

    /// Stride of `axis` in elements; compressed layouts have none and report 0.
    pub fn stride(&self, axis: usize) -> usize {
        match self {
            Self::Dense(l) => l.stride(axis),
            Self::Csc(_) => 0,
        }
    }

    /// A `rows` x `cols` window lies inside the stored box.
    pub fn contains_window(&self, rows: Range, cols: Range) -> bool {
        match self {
            Self::Dense(l) => l.contains_window(&[rows, cols]),
            Self::Csc(l) => l.bbox().contains(&BoundingBox::new([rows, cols])),
        }
    }

    /// Element offset of the top-left entry of a sub-tensor.
    ///
    /// Compressed layouts are addressed through their coordinate list, so the value
    /// array always starts at offset 0.
    pub fn subtensor_offset(&self, top_left: &[usize]) -> Result<usize> {
        match self {
            Self::Dense(l) => l.address(top_left),
            Self::Csc(_) => Ok(0),
        }
    }

    pub fn aligned_stride(&self, alignment: usize) -> bool {
        match self {
            Self::Dense(l) => l.aligned_stride(alignment),
            Self::Csc(_) => false,
        }
    }

    pub fn required_reals(&self) -> usize {
        match self {
            Self::Dense(l) => l.required_reals(),
            Self::Csc(l) => l.nnz(),
        }
    }
}

impl From<DenseLayout> for MemoryLayout {
    fn from(l: DenseLayout) -> Self {
        Self::Dense(l)
    }
}

impl From<CscLayout> for MemoryLayout {
    fn from(l: CscLayout) -> Self {
        Self::Csc(l)
    }
}
