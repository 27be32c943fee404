//! Loop nests and loop-range validation shared by LoG and product operations.

use logemm_ir::{IndexedTensorDescription, Indices, LoopRanges, loop_ranges_contained, loop_ranges_equal};
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::flops::Flops;
use crate::session::EmitContext;

/// Code emitted once per iteration of a loop nest.
pub trait LoopBody {
    fn emit(&mut self, ctx: &mut EmitContext<'_>) -> Result<Flops>;
}

/// Wrap `body` in one loop per index, the last index outermost.
///
/// The returned count is the body's count times every range size.
pub fn for_loops(
    ctx: &mut EmitContext<'_>,
    indices: &Indices,
    ranges: &LoopRanges,
    body: &mut dyn LoopBody,
) -> Result<Flops> {
    let names: Vec<char> = indices.names().collect();
    nest(ctx, &names, ranges, body)
}

fn nest(ctx: &mut EmitContext<'_>, names: &[char], ranges: &LoopRanges, body: &mut dyn LoopBody) -> Result<Flops> {
    let Some((&index, inner)) = names.split_last() else {
        return body.emit(ctx);
    };
    let range = *ranges.get(&index).context(MissingLoopRangeSnafu { index })?;

    ctx.open_loop(index, range);
    let flops = nest(ctx, inner, ranges, body)?;
    ctx.close_loop(index);
    Ok(flops.scaled(range.size() as u64))
}

/// Merge the operand ranges of `loop_indices` into one map.
///
/// Left and right must agree where both carry an index and both must stay inside the
/// result's ranges. Operand ranges override the result's; every loop index must end
/// up with a range.
pub fn merge_loop_ranges(
    operation: &str,
    result: &IndexedTensorDescription,
    left: &IndexedTensorDescription,
    right: &IndexedTensorDescription,
    loop_indices: &Indices,
) -> Result<LoopRanges> {
    let r_c = result.loop_ranges(loop_indices);
    let r_a = left.loop_ranges(loop_indices);
    let r_b = right.loop_ranges(loop_indices);

    ensure!(
        loop_ranges_equal(&r_a, &r_b),
        LoopRangeMismatchSnafu {
            operation,
            reason: format!("{} and {} disagree on shared loop ranges", left.name, right.name),
        }
    );
    for (term, ranges) in [(left, &r_a), (right, &r_b)] {
        ensure!(
            loop_ranges_contained(ranges, &r_c),
            LoopRangeMismatchSnafu {
                operation,
                reason: format!("loop ranges of {} exceed those of {}", term.name, result.name),
            }
        );
    }

    let mut merged = r_c;
    merged.extend(r_a);
    merged.extend(r_b);
    if let Some(index) = loop_indices.names().find(|name| !merged.contains_key(name)) {
        return MissingLoopRangeSnafu { index }.fail();
    }
    Ok(merged)
}
