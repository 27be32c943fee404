//! Tensor operand descriptions.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::{BoundingBox, DenseLayout, Indices, LoopRanges, MemoryLayout, SparsityPattern};

/// A 2-D (or degenerate) operand of one GEMM.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDescription {
    pub name: String,
    pub layout: MemoryLayout,
    pub pattern: SparsityPattern,
    /// Value is known at generation time; no runtime pointer is passed.
    pub is_compute_constant: bool,
    /// Lives only inside the current kernel.
    pub is_temporary: bool,
}

impl TensorDescription {
    pub fn new(name: impl Into<String>, layout: impl Into<MemoryLayout>, pattern: SparsityPattern) -> Self {
        Self { name: name.into(), layout: layout.into(), pattern, is_compute_constant: false, is_temporary: false }
    }

    pub fn compute_constant(mut self, value: bool) -> Self {
        self.is_compute_constant = value;
        self
    }

    pub fn temporary(mut self, value: bool) -> Self {
        self.is_temporary = value;
        self
    }

    /// Tightest box around the structural nonzeros.
    pub fn bbox(&self) -> BoundingBox {
        self.pattern.bounding_box()
    }
}

/// An N-D operand together with the index names of its axes.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTensorDescription {
    pub name: String,
    pub indices: Indices,
    pub layout: MemoryLayout,
    pub pattern: SparsityPattern,
    pub is_compute_constant: bool,
    pub is_temporary: bool,
}

impl IndexedTensorDescription {
    /// Pattern and layout must have one axis per index with matching extents.
    pub fn new(
        name: impl Into<String>,
        indices: Indices,
        layout: impl Into<MemoryLayout>,
        pattern: SparsityPattern,
    ) -> Result<Self> {
        let layout = layout.into();
        let shape = indices.shape();
        ensure!(
            pattern.shape() == shape.as_slice(),
            ShapeMismatchSnafu { expected: shape.clone(), actual: SmallVec::from(pattern.shape()) }
        );
        ensure!(
            layout.shape() == shape.as_slice(),
            ShapeMismatchSnafu { expected: shape.clone(), actual: SmallVec::from(layout.shape()) }
        );
        Ok(Self {
            name: name.into(),
            indices,
            layout,
            pattern,
            is_compute_constant: false,
            is_temporary: false,
        })
    }

    /// Fully dense operand with a column-major layout.
    pub fn dense(name: impl Into<String>, indices: Indices) -> Self {
        let shape = indices.shape();
        Self {
            name: name.into(),
            layout: DenseLayout::new(&shape).into(),
            pattern: SparsityPattern::dense(&shape),
            indices,
            is_compute_constant: false,
            is_temporary: false,
        }
    }

    pub fn compute_constant(mut self, value: bool) -> Self {
        self.is_compute_constant = value;
        self
    }

    pub fn temporary(mut self, value: bool) -> Self {
        self.is_temporary = value;
        self
    }

    /// Range of every loop index this operand carries, taken from its nonzero box.
    pub fn loop_ranges(&self, loop_indices: &Indices) -> LoopRanges {
        let bbox = self.pattern.bounding_box();
        self.indices
            .names()
            .enumerate()
            .filter(|(_, name)| loop_indices.contains(*name))
            .map(|(axis, name)| (name, bbox[axis]))
            .collect()
    }

    /// Replace the N-D view by a projected 2-D view, keeping name and flags.
    pub fn with_view(&self, layout: MemoryLayout, pattern: SparsityPattern) -> TensorDescription {
        TensorDescription {
            name: self.name.clone(),
            layout,
            pattern,
            is_compute_constant: self.is_compute_constant,
            is_temporary: self.is_temporary,
        }
    }
}

/// Ranges agree on every index both maps contain.
pub fn loop_ranges_equal(a: &LoopRanges, b: &LoopRanges) -> bool {
    a.iter().all(|(name, range)| b.get(name).is_none_or(|other| other == range))
}

/// Every range of `inner` lies inside the range of the same index in `outer`.
pub fn loop_ranges_contained(inner: &LoopRanges, outer: &LoopRanges) -> bool {
    inner.iter().all(|(name, range)| outer.get(name).is_none_or(|other| other.contains(range)))
}
