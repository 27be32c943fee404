use bon::bon;
use logemm_ir::{IndexedTensorDescription, LoopRanges};
use snafu::ensure;

use crate::error::*;
use crate::loops::merge_loop_ranges;
use crate::scalar::Scalar;

/// Product over the result's indices; the operands carry subsets of them.
#[derive(Debug, Clone)]
pub struct ProductDescription {
    alpha: Scalar,
    add: bool,
    result: IndexedTensorDescription,
    left: IndexedTensorDescription,
    right: IndexedTensorDescription,
    loop_ranges: LoopRanges,
}

#[bon]
impl ProductDescription {
    #[builder]
    pub fn new(
        result: IndexedTensorDescription,
        left: IndexedTensorDescription,
        right: IndexedTensorDescription,
        #[builder(into, default = Scalar::ONE)] alpha: Scalar,
        #[builder(default)] add: bool,
    ) -> Result<Self> {
        for term in [&left, &right] {
            if let Some(index) = term.indices.names().find(|name| !result.indices.contains(*name)) {
                return LoopRangeMismatchSnafu {
                    operation: "product",
                    reason: format!("index '{index}' of {} is not an index of {}", term.name, result.name),
                }
                .fail();
            }
        }
        ensure!(
            !result.layout.is_csc(),
            CompressedOperandSnafu { name: result.name.clone(), operation: "product" }
        );
        let loop_ranges = merge_loop_ranges("product", &result, &left, &right, &result.indices)?;
        Ok(Self { alpha, add, result, left, right, loop_ranges })
    }
}

impl ProductDescription {
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

    pub fn loop_ranges(&self) -> &LoopRanges {
        &self.loop_ranges
    }

    /// Number of loop iterations, one scalar statement each.
    pub fn iterations(&self) -> u64 {
        self.result.indices.names().filter_map(|name| self.loop_ranges.get(&name)).map(|r| r.size() as u64).product()
    }

    /// Flops of one iteration: the multiply, the alpha scale and the accumulation.
    pub fn flops_per_iteration(&self) -> u64 {
        1 + u64::from(!self.alpha.is_one()) + u64::from(self.add)
    }
}
