use bon::bon;
use logemm_ir::{IndexedTensorDescription, Indices, LoopRanges, Range};

use crate::error::*;
use crate::loops::merge_loop_ranges;
use crate::scalar::Scalar;

/// Progress of one LoG emission, reported at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LogPhase {
    Constructed,
    RangesValidated,
    Zeroed,
    AssignPass,
    AddPass,
    Done,
}

/// `result (+)= alpha * left * right` with loops over `loop_indices`.
#[derive(Debug, Clone)]
pub struct LogDescription {
    alpha: Scalar,
    add: bool,
    result: IndexedTensorDescription,
    left: IndexedTensorDescription,
    right: IndexedTensorDescription,
    loop_indices: Indices,
    inner_loop_indices: Indices,
    outer_loop_indices: Indices,
    loop_ranges: LoopRanges,
    assign_loop_ranges: Option<LoopRanges>,
    add_loop_ranges: Option<LoopRanges>,
    trans_a: bool,
    trans_b: bool,
    prefetch_name: Option<String>,
}

/// Split the inner loop range into an assigning and an accumulating pass.
///
/// Without inner loops the single pass assigns unless `add` is set. With inner loops
/// and `add` unset, the first inner index contributes its first iteration to the
/// assign pass and the rest to the add pass. Empty passes are dropped.
pub fn peel(loop_ranges: &LoopRanges, inner: &Indices, add: bool) -> (Option<LoopRanges>, Option<LoopRanges>) {
    let peeled = match inner.first() {
        Some(index) if !add => index,
        Some(_) => return (None, Some(loop_ranges.clone())),
        None if add => return (None, Some(loop_ranges.clone())),
        None => return (Some(loop_ranges.clone()), None),
    };
    let Some(&range) = loop_ranges.get(&peeled) else {
        return (None, None);
    };

    let split = (range.start + 1).min(range.stop);
    let pass = |start, stop| {
        let range = Range::new(start, stop);
        (!range.is_empty()).then(|| {
            let mut ranges = loop_ranges.clone();
            ranges.insert(peeled, range);
            ranges
        })
    };
    (pass(range.start, split), pass(split, range.stop))
}

#[bon]
impl LogDescription {
    /// Validate loop ranges and derive the loop split and peeling.
    #[builder]
    pub fn new(
        result: IndexedTensorDescription,
        left: IndexedTensorDescription,
        right: IndexedTensorDescription,
        loop_indices: Indices,
        #[builder(into, default = Scalar::ONE)] alpha: Scalar,
        #[builder(default)] add: bool,
        #[builder(default)] trans_a: bool,
        #[builder(default)] trans_b: bool,
        #[builder(into)] prefetch_name: Option<String>,
    ) -> Result<Self> {
        tracing::trace!(log.phase = %LogPhase::Constructed, result = %result.name, loops = %loop_indices, "LoG");
        let loop_ranges = merge_loop_ranges("LoG", &result, &left, &right, &loop_indices)?;
        tracing::trace!(log.phase = %LogPhase::RangesValidated, result = %result.name, "LoG");

        let inner_loop_indices = &loop_indices - &result.indices;
        let outer_loop_indices = &loop_indices - &inner_loop_indices;
        let (assign_loop_ranges, add_loop_ranges) = peel(&loop_ranges, &inner_loop_indices, add);

        Ok(Self {
            alpha,
            add,
            result,
            left,
            right,
            loop_indices,
            inner_loop_indices,
            outer_loop_indices,
            loop_ranges,
            assign_loop_ranges,
            add_loop_ranges,
            trans_a,
            trans_b,
            prefetch_name,
        })
    }
}

impl LogDescription {
    pub fn alpha(&self) -> &Scalar {
        &self.alpha
    }

    pub fn add(&self) -> bool {
        self.add
    }

    pub fn result(&self) -> &IndexedTensorDescription {
        &self.result
    }

    pub fn left(&self) -> &IndexedTensorDescription {
        &self.left
    }

    pub fn right(&self) -> &IndexedTensorDescription {
        &self.right
    }

    pub fn loop_indices(&self) -> &Indices {
        &self.loop_indices
    }

    /// Loop indices the result does not carry.
    pub fn inner_loop_indices(&self) -> &Indices {
        &self.inner_loop_indices
    }

    pub fn outer_loop_indices(&self) -> &Indices {
        &self.outer_loop_indices
    }

    pub fn loop_ranges(&self) -> &LoopRanges {
        &self.loop_ranges
    }

    pub fn assign_loop_ranges(&self) -> Option<&LoopRanges> {
        self.assign_loop_ranges.as_ref()
    }

    pub fn add_loop_ranges(&self) -> Option<&LoopRanges> {
        self.add_loop_ranges.as_ref()
    }

    pub fn trans_a(&self) -> bool {
        self.trans_a
    }

    pub fn trans_b(&self) -> bool {
        self.trans_b
    }

    pub fn prefetch_name(&self) -> Option<&str> {
        self.prefetch_name.as_deref()
    }
}
