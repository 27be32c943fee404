//! LoG emission: projection, zero fill, pointer re-basing and the GEMM passes.

use logemm_ir::projection::{defuse, project, reduce_pattern};
use logemm_ir::{IndexedTensorDescription, Indices, MemoryLayout, SparsityPattern, TensorDescription};
use snafu::OptionExt;

use crate::batch::PointerRebase;
use crate::error::*;
use crate::flops::Flops;
use crate::gemm::{self, GemmDescription};
use crate::log::{LogDescription, LogPhase};
use crate::loops::{LoopBody, for_loops};
use crate::scalar::Scalar;
use crate::session::EmitContext;
use crate::zero::{WriteRegion, initialize_with_zero, write_box};

/// Pointer names of one operand at the outer and inner loop levels.
#[derive(Debug, Clone)]
struct Operand {
    outer: String,
    inner: String,
}

impl Operand {
    fn new(name: &str, outer: &str, inner: &str, has_outer: bool, has_inner: bool) -> Self {
        let outer = if has_outer { outer.to_string() } else { name.to_string() };
        let inner = if has_inner { inner.to_string() } else { outer.clone() };
        Self { outer, inner }
    }
}

#[derive(Debug, Clone)]
struct OperandNames {
    a: Operand,
    b: Operand,
    c: Operand,
    prefetch: Option<Operand>,
}

impl OperandNames {
    fn new(d: &LogDescription) -> Self {
        let has_outer = !d.outer_loop_indices().is_empty();
        let has_inner = !d.inner_loop_indices().is_empty();
        Self {
            a: Operand::new(&d.left().name, "_A", "_Ain", has_outer, has_inner),
            b: Operand::new(&d.right().name, "_B", "_Bin", has_outer, has_inner),
            c: Operand::new(&d.result().name, "_C", "_Cin", has_outer, has_inner),
            prefetch: d
                .prefetch_name()
                .map(|name| Operand::new(name, "_Cprefetch", "_Cprefetchin", has_outer, has_inner)),
        }
    }
}

/// `T* name = base + <offset of the loop variables in loops>;`
fn rebase(
    ctx: &mut EmitContext<'_>,
    term: &IndexedTensorDescription,
    (name, base): (&str, &str),
    loops: &Indices,
    is_const: bool,
) -> Result<()> {
    let subset = &term.indices & loops;
    let offset = if subset.is_empty() {
        String::new()
    } else {
        let layout = term
            .layout
            .as_dense()
            .context(CompressedOperandSnafu { name: term.name.clone(), operation: "pointer re-basing" })?;
        layout.address_string(&term.indices, &subset)
    };
    ctx.pointer(PointerRebase { name: name.to_string(), base: base.to_string(), offset, is_const });
    Ok(())
}

/// The loop variables of `loops` move `term`'s pointer by alignment multiples only.
fn aligned_start(term: &IndexedTensorDescription, loops: &Indices, aligned_reals: usize) -> bool {
    let subset = &term.indices & loops;
    subset.is_empty()
        || term.layout.as_dense().is_some_and(|l| l.is_aligned_address_string(&term.indices, &subset, aligned_reals))
}

fn view(term: &IndexedTensorDescription, name: &str, layout: MemoryLayout, pattern: SparsityPattern) -> TensorDescription {
    let mut view = term.with_view(layout, pattern);
    view.name = name.to_string();
    view
}

/// Outer loop body: outer re-bases, then the assign and add passes.
struct OuterBody<'d> {
    d: &'d LogDescription,
    gemm: GemmDescription,
    names: OperandNames,
}

impl LoopBody for OuterBody<'_> {
    fn emit(&mut self, ctx: &mut EmitContext<'_>) -> Result<Flops> {
        let d = self.d;
        let outer = d.outer_loop_indices();
        if !outer.is_empty() {
            let n = &self.names;
            rebase(ctx, d.left(), (&n.a.outer, &d.left().name), outer, true)?;
            rebase(ctx, d.right(), (&n.b.outer, &d.right().name), outer, true)?;
            rebase(ctx, d.result(), (&n.c.outer, &d.result().name), outer, false)?;
            if let (Some(prefetch), Some(base)) = (&n.prefetch, d.prefetch_name()) {
                rebase(ctx, d.result(), (&prefetch.outer, base), outer, true)?;
            }
        }

        let mut flops = Flops::ZERO;
        for (phase, ranges, beta) in [
            (LogPhase::AssignPass, d.assign_loop_ranges(), Scalar::ZERO),
            (LogPhase::AddPass, d.add_loop_ranges(), Scalar::ONE),
        ] {
            let Some(ranges) = ranges else { continue };
            tracing::trace!(log.phase = %phase, result = %d.result().name, ranges = ?ranges, "LoG");
            self.gemm.set_beta(beta);
            let mut body = GemmBody { d, gemm: &self.gemm, names: &self.names };
            flops += for_loops(ctx, d.inner_loop_indices(), ranges, &mut body)?;
        }
        Ok(flops)
    }
}

/// Inner loop body: inner re-bases, then one GEMM.
struct GemmBody<'d> {
    d: &'d LogDescription,
    gemm: &'d GemmDescription,
    names: &'d OperandNames,
}

impl LoopBody for GemmBody<'_> {
    fn emit(&mut self, ctx: &mut EmitContext<'_>) -> Result<Flops> {
        let d = self.d;
        let inner = d.inner_loop_indices();
        if !inner.is_empty() {
            let n = self.names;
            rebase(ctx, d.left(), (&n.a.inner, &n.a.outer), inner, true)?;
            rebase(ctx, d.right(), (&n.b.inner, &n.b.outer), inner, true)?;
            rebase(ctx, d.result(), (&n.c.inner, &n.c.outer), inner, false)?;
            if let Some(prefetch) = &n.prefetch {
                rebase(ctx, d.result(), (&prefetch.inner, &prefetch.outer), inner, true)?;
            }
        }
        gemm::generate(self.gemm, ctx)
    }
}

/// Emit `d` as loops around one GEMM.
pub fn generate(d: &LogDescription, ctx: &mut EmitContext<'_>) -> Result<Flops> {
    let loops = d.loop_indices();
    let a = &d.left().indices - loops;
    let b = &d.right().indices - loops;
    let c = &d.result().indices - loops;
    let im = &a & &c;
    let in_ = &b & &c;
    let ik = &a & &b;

    let a_layout = project(d.left(), &im, &ik)?;
    let b_layout = project(d.right(), &ik, &in_)?;
    let c_layout = project(d.result(), &im, &in_)?;
    let a_pattern = reduce_pattern(d.left(), &a, &a_layout)?;
    let b_pattern = reduce_pattern(d.right(), &b, &b_layout)?;
    let c_pattern = reduce_pattern(d.result(), &c, &c_layout)?;

    // Batched kernels address the original operands; re-bases are recorded alongside.
    let names = OperandNames::new(d);
    let batched = ctx.is_batched();
    let gemm_name = |term: &IndexedTensorDescription, operand: &Operand| {
        if batched { term.name.clone() } else { operand.inner.clone() }
    };

    let reals = ctx.arch().aligned_reals();
    let (outer, inner) = (d.outer_loop_indices(), d.inner_loop_indices());
    let gemm = GemmDescription::builder()
        .left(view(d.left(), &gemm_name(d.left(), &names.a), a_layout, a_pattern))
        .right(view(d.right(), &gemm_name(d.right(), &names.b), b_layout, b_pattern))
        .result(view(d.result(), &gemm_name(d.result(), &names.c), c_layout, c_pattern))
        .arch(ctx.arch())
        .trans_a(d.trans_a())
        .trans_b(d.trans_b())
        .alpha(d.alpha().clone())
        .beta(if d.add() { Scalar::ONE } else { Scalar::ZERO })
        .aligned_start_a(aligned_start(d.left(), outer, reals) && aligned_start(d.left(), inner, reals))
        .aligned_start_c(aligned_start(d.result(), outer, reals) && aligned_start(d.result(), inner, reals))
        .maybe_prefetch_name(names.prefetch.as_ref().map(|p| p.inner.clone()))
        .build()?;

    if !d.add() {
        let (m, n, _) = gemm.mnk();
        let mut ranges = d.loop_ranges().clone();
        ranges.extend(defuse(m, d.left(), &im)?);
        ranges.extend(defuse(n, d.right(), &in_)?);
        let written = WriteRegion::new(write_box(d.result(), &ranges)?).fused(im.clone(), m).fused(in_.clone(), n);
        initialize_with_zero(ctx, d.result(), &written)?;
        tracing::trace!(log.phase = %LogPhase::Zeroed, result = %d.result().name, written = %written.bbox(), "LoG");
    }

    let mut body = OuterBody { d, gemm, names };
    let flops = for_loops(ctx, outer, d.loop_ranges(), &mut body)?;
    tracing::trace!(log.phase = %LogPhase::Done, result = %d.result().name, flops = %flops, "LoG");
    Ok(flops)
}
