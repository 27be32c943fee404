//! Portable GEMM as plain C loops.
//!
//! Used when no tool in the capability table accepts a GEMM, for example because an
//! operand has a non-unit leading stride. Compressed operands are fully unrolled over
//! their nonzeros.

use logemm_ir::{DenseLayout, MemoryLayout, TensorDescription, loop_variable};
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::gemm::GemmDescription;
use crate::scalar::Scalar;
use crate::session::EmitContext;

/// One matrix coordinate of an access: a loop variable or a constant.
#[derive(Debug, Clone, Copy)]
enum Coord {
    Var(char),
    Fixed(usize),
}

/// C offset expression of `(row, col)` in `layout`.
fn offset(layout: &DenseLayout, row: Coord, col: Coord) -> String {
    let mut constant = 0isize;
    let mut terms = Vec::new();
    for (axis, coord) in [row, col].into_iter().enumerate() {
        let stride = layout.stride(axis);
        let start = layout.bbox()[axis].start;
        match coord {
            Coord::Var(index) => {
                let var = loop_variable(index);
                terms.push(if start == 0 { format!("{stride}*{var}") } else { format!("{stride}*({var}-{start})") });
            }
            Coord::Fixed(value) => constant += stride as isize * (value as isize - start as isize),
        }
    }
    if constant != 0 || terms.is_empty() {
        terms.push(constant.to_string());
    }
    terms.join(" + ")
}

fn dense<'a>(term: &'a TensorDescription) -> Result<&'a DenseLayout> {
    term.layout.as_dense().context(CompressedOperandSnafu { name: term.name.clone(), operation: "fallback GEMM" })
}

/// `(row, col)` of an operand, swapped when it is stored transposed.
fn oriented(row: Coord, col: Coord, transpose: bool) -> (Coord, Coord) {
    if transpose { (col, row) } else { (row, col) }
}

pub fn generate(d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<u64> {
    d.check_windows()?;
    ensure!(
        !((d.is_a_csc() && d.trans_a()) || (d.is_b_csc() && d.trans_b())),
        TransposeUnsupportedSnafu { tool: "fallback GEMM on a compressed operand" }
    );

    let (m, n, k) = d.mnk();
    let (a, b, c) = (d.left(), d.right(), d.result());
    let c_layout = dense(c)?;
    let dtype = ctx.arch().dtype();
    let scale = if d.alpha().is_one() { String::new() } else { format!("{} * ", d.alpha().render(dtype)) };

    let beta = d.beta();
    if !beta.is_one() {
        ctx.sink.open_for('n', n);
        ctx.sink.open_for('m', m);
        let target = format!("{}[{}]", c.name, offset(c_layout, Coord::Var('m'), Coord::Var('n')));
        if beta.is_zero() {
            ctx.sink.line(format!("{target} = {};", Scalar::ZERO.render(dtype)));
        } else {
            ctx.sink.line(format!("{target} *= {};", beta.render(dtype)));
        }
        ctx.sink.close_block();
        ctx.sink.close_block();
    }

    match (&a.layout, &b.layout) {
        (MemoryLayout::Csc(csc), _) => {
            let b_layout = dense(b)?;
            ctx.sink.open_for('n', n);
            for (row, col) in csc.entries(m, k) {
                let Some(value) = csc.address(row, col) else { continue };
                let (b_row, b_col) = oriented(Coord::Fixed(col), Coord::Var('n'), d.trans_b());
                ctx.sink.line(format!(
                    "{}[{}] += {scale}{}[{value}] * {}[{}];",
                    c.name,
                    offset(c_layout, Coord::Fixed(row), Coord::Var('n')),
                    a.name,
                    b.name,
                    offset(b_layout, b_row, b_col),
                ));
            }
            ctx.sink.close_block();
        }
        (_, MemoryLayout::Csc(csc)) => {
            let a_layout = dense(a)?;
            ctx.sink.open_for('m', m);
            for (row, col) in csc.entries(k, n) {
                let Some(value) = csc.address(row, col) else { continue };
                let (a_row, a_col) = oriented(Coord::Var('m'), Coord::Fixed(row), d.trans_a());
                ctx.sink.line(format!(
                    "{}[{}] += {scale}{}[{}] * {}[{value}];",
                    c.name,
                    offset(c_layout, Coord::Var('m'), Coord::Fixed(col)),
                    a.name,
                    offset(a_layout, a_row, a_col),
                    b.name,
                ));
            }
            ctx.sink.close_block();
        }
        (MemoryLayout::Dense(a_layout), MemoryLayout::Dense(b_layout)) => {
            let (a_row, a_col) = oriented(Coord::Var('m'), Coord::Var('k'), d.trans_a());
            let (b_row, b_col) = oriented(Coord::Var('k'), Coord::Var('n'), d.trans_b());
            ctx.sink.open_for('n', n);
            ctx.sink.open_for('k', k);
            ctx.sink.open_for('m', m);
            ctx.sink.line(format!(
                "{}[{}] += {scale}{}[{}] * {}[{}];",
                c.name,
                offset(c_layout, Coord::Var('m'), Coord::Var('n')),
                a.name,
                offset(a_layout, a_row, a_col),
                b.name,
                offset(b_layout, b_row, b_col),
            ));
            ctx.sink.close_block();
            ctx.sink.close_block();
            ctx.sink.close_block();
        }
    }

    Ok(d.flops())
}
