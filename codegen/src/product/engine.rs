use logemm_ir::{IndexedTensorDescription, Range};
use snafu::OptionExt;

use crate::batch::BatchEntry;
use crate::error::*;
use crate::flops::Flops;
use crate::gemm::Addressing;
use crate::loops::{LoopBody, for_loops};
use crate::product::ProductDescription;
use crate::session::EmitContext;
use crate::zero::{WriteRegion, initialize_with_zero, write_box};

/// A product recorded for the accelerator.
#[derive(Debug, Clone)]
pub struct BatchedProduct {
    pub description: ProductDescription,
    /// Loop range of every result index, in index order.
    pub ranges: Vec<Range>,
    /// Addressing of left, right and result.
    pub addressing: [Addressing; 3],
    pub arguments: Vec<String>,
}

/// `name[offset]` with the offset of every loop variable of `term`.
fn access(term: &IndexedTensorDescription) -> Result<String> {
    let layout = term
        .layout
        .as_dense()
        .context(CompressedOperandSnafu { name: term.name.clone(), operation: "product" })?;
    let offset = layout.address_string(&term.indices, &term.indices);
    Ok(format!("{}[{}]", term.name, if offset.is_empty() { "0" } else { &offset }))
}

struct StatementBody {
    statement: String,
    flops: u64,
}

impl LoopBody for StatementBody {
    fn emit(&mut self, ctx: &mut EmitContext<'_>) -> Result<Flops> {
        ctx.sink.line(&self.statement);
        Ok(Flops::Exact(self.flops))
    }
}

fn record(d: &ProductDescription, ctx: &mut EmitContext<'_>) -> Result<Flops> {
    tracing::warn!(result = %d.result().name, "accelerator products are experimental");

    let terms = [d.left(), d.right(), d.result()];
    let addressing = terms.map(|t| Addressing::of(&t.name, t.is_compute_constant, t.is_temporary));
    let arguments = terms.iter().zip(addressing).filter_map(|(t, a)| a.argument(&t.name)).collect();
    let ranges = d.result().indices.names().filter_map(|name| d.loop_ranges().get(&name).copied()).collect();

    ctx.session.batch_mut().push(BatchEntry::Product(Box::new(BatchedProduct {
        description: d.clone(),
        ranges,
        addressing,
        arguments,
    })));
    Ok(Flops::Unknown)
}

/// Emit `d`: a loop nest with one scalar statement, or a batch entry.
pub fn generate(d: &ProductDescription, ctx: &mut EmitContext<'_>) -> Result<Flops> {
    if ctx.is_batched() {
        return record(d, ctx);
    }

    let scale = if d.alpha().is_one() { String::new() } else { format!("{} * ", d.alpha().render(ctx.arch().dtype())) };
    let operator = if d.add() { "+=" } else { "=" };
    let statement = format!("{} {operator} {scale}{} * {};", access(d.result())?, access(d.left())?, access(d.right())?);

    if !d.add() {
        let written = WriteRegion::new(write_box(d.result(), d.loop_ranges())?);
        initialize_with_zero(ctx, d.result(), &written)?;
    }

    let mut body = StatementBody { statement, flops: d.flops_per_iteration() };
    for_loops(ctx, &d.result().indices, d.loop_ranges(), &mut body)
}
