//! The canonical 2-D GEMM `C = alpha * op(A) * op(B) + beta * C`.

use bon::bon;
use logemm_ir::{BoundingBox, MemoryLayout, Range, TensorDescription};
use snafu::ensure;

use crate::arch::{Architecture, Target};
use crate::config::GemmQuery;
use crate::error::*;
use crate::scalar::Scalar;

/// Nonzero coordinates of the compressed operand inside the GEMM window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sparsity {
    pub entries: Vec<(usize, usize)>,
    /// Row extent of the compressed operand's allocated shape.
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct GemmDescription {
    result: TensorDescription,
    left: TensorDescription,
    right: TensorDescription,
    trans_a: bool,
    trans_b: bool,
    alpha: Scalar,
    beta: Scalar,
    m: Range,
    n: Range,
    k: Range,
    is_a_csc: bool,
    is_b_csc: bool,
    aligned_a: bool,
    aligned_c: bool,
    prefetch_name: Option<String>,
}

fn matrix_box(term: &TensorDescription) -> Result<BoundingBox> {
    let bbox = term.bbox();
    ensure!(bbox.rank() == 2, OperandRankSnafu { name: term.name.clone(), rank: bbox.rank() });
    Ok(bbox)
}

#[bon]
impl GemmDescription {
    /// Derive `(m, n, k)` from the operand patterns and fix the alignment flags.
    ///
    /// `aligned_start_a`/`aligned_start_c` state that the operand base pointers are
    /// SIMD-aligned. Aligned variants additionally need an aligned leading dimension,
    /// an untransposed A, and either both flags (then `m` is widened to the alignment)
    /// or an aligned `m.start`.
    #[builder]
    pub fn new(
        result: TensorDescription,
        left: TensorDescription,
        right: TensorDescription,
        arch: &Architecture,
        #[builder(default)] trans_a: bool,
        #[builder(default)] trans_b: bool,
        #[builder(into, default = Scalar::ONE)] alpha: Scalar,
        #[builder(into, default = Scalar::ZERO)] beta: Scalar,
        #[builder(default = true)] aligned_start_a: bool,
        #[builder(default = true)] aligned_start_c: bool,
        #[builder(into)] prefetch_name: Option<String>,
    ) -> Result<Self> {
        let is_a_csc = left.layout.is_csc();
        let is_b_csc = right.layout.is_csc();
        ensure!(!(is_a_csc && is_b_csc), SparseTimesSparseSnafu { left: left.name.clone(), right: right.name.clone() });

        let bb_a = matrix_box(&left)?;
        let bb_b = matrix_box(&right)?;
        let bb_c = matrix_box(&result)?;

        let k_a = if trans_a { 0 } else { 1 };
        let k_b = if trans_b { 1 } else { 0 };
        let k = bb_a[k_a] & bb_b[k_b];
        let mut m = bb_a[1 - k_a];
        let n = bb_b[1 - k_b];

        ensure!(
            bb_c[0].contains(&m),
            OutOfBoundsSnafu { operand: result.name.clone(), axis: "m", range: m, bound: bb_c[0].to_string() }
        );
        ensure!(
            bb_c[1].contains(&n),
            OutOfBoundsSnafu { operand: result.name.clone(), axis: "n", range: n, bound: bb_c[1].to_string() }
        );

        let reals = arch.aligned_reals();
        let mut aligned_a = aligned_start_a && !trans_a && left.layout.aligned_stride(reals);
        let mut aligned_c = aligned_start_c && result.layout.aligned_stride(reals);
        if aligned_a && aligned_c {
            m = m.aligned(reals);
        } else {
            let start_aligned = arch.check_alignment(m.start);
            aligned_a &= start_aligned;
            aligned_c &= start_aligned;
        }

        Ok(Self {
            result,
            left,
            right,
            trans_a,
            trans_b,
            alpha,
            beta,
            m,
            n,
            k,
            is_a_csc,
            is_b_csc,
            aligned_a,
            aligned_c,
            prefetch_name,
        })
    }
}

impl GemmDescription {
    pub fn result(&self) -> &TensorDescription {
        &self.result
    }

    pub fn left(&self) -> &TensorDescription {
        &self.left
    }

    pub fn right(&self) -> &TensorDescription {
        &self.right
    }

    pub fn trans_a(&self) -> bool {
        self.trans_a
    }

    pub fn trans_b(&self) -> bool {
        self.trans_b
    }

    pub fn alpha(&self) -> &Scalar {
        &self.alpha
    }

    pub fn beta(&self) -> &Scalar {
        &self.beta
    }

    pub fn set_beta(&mut self, beta: impl Into<Scalar>) {
        self.beta = beta.into();
    }

    pub fn mnk(&self) -> (Range, Range, Range) {
        (self.m, self.n, self.k)
    }

    pub fn is_a_csc(&self) -> bool {
        self.is_a_csc
    }

    pub fn is_b_csc(&self) -> bool {
        self.is_b_csc
    }

    pub fn aligned_a(&self) -> bool {
        self.aligned_a
    }

    pub fn aligned_c(&self) -> bool {
        self.aligned_c
    }

    pub fn prefetch_name(&self) -> Option<&str> {
        self.prefetch_name.as_deref()
    }

    /// Leading dimensions; compressed operands report 0.
    pub fn leading_dimensions(&self) -> (usize, usize, usize) {
        let ld = |layout: &MemoryLayout| if layout.is_csc() { 0 } else { layout.stride(1) };
        (ld(&self.left.layout), ld(&self.right.layout), ld(&self.result.layout))
    }

    /// Nonzeros of the compressed operand inside the GEMM window.
    pub fn sparsity(&self) -> Option<Sparsity> {
        let (m, n, k) = self.mnk();
        let (layout, rows, cols) = if self.is_a_csc {
            if self.trans_a { (&self.left.layout, k, m) } else { (&self.left.layout, m, k) }
        } else if self.is_b_csc {
            if self.trans_b { (&self.right.layout, n, k) } else { (&self.right.layout, k, n) }
        } else {
            return None;
        };
        let csc = layout.as_csc()?;
        Some(Sparsity { entries: csc.entries(rows, cols), rows: csc.shape()[0] })
    }

    /// `2mnk`, with the compressed operand's window nonzeros replacing its extents.
    pub fn flops(&self) -> u64 {
        let (m, n, k) = self.mnk();
        let flops = match self.sparsity() {
            Some(spp) if self.is_a_csc => 2 * spp.entries.len() * n.size(),
            Some(spp) => 2 * m.size() * spp.entries.len(),
            None => 2 * m.size() * n.size() * k.size(),
        };
        flops as u64
    }

    pub fn query(&self, target: Target) -> GemmQuery {
        let (m, n, k) = self.mnk();
        GemmQuery {
            m: m.size(),
            n: n.size(),
            k: k.size(),
            sparse_a: self.is_a_csc,
            sparse_b: self.is_b_csc,
            trans_a: self.trans_a,
            trans_b: self.trans_b,
            alpha: self.alpha.clone(),
            beta: self.beta.clone(),
            aligned_a: self.aligned_a,
            aligned_c: self.aligned_c,
            target,
        }
    }

    /// Every operand window lies inside its stored box.
    pub fn check_windows(&self) -> Result<()> {
        let (m, n, k) = self.mnk();
        let (a_rows, a_cols) = if self.trans_a { (k, m) } else { (m, k) };
        let (b_rows, b_cols) = if self.trans_b { (n, k) } else { (k, n) };
        for (term, rows, cols) in [(&self.left, a_rows, a_cols), (&self.right, b_rows, b_cols), (&self.result, m, n)] {
            ensure!(
                term.layout.contains_window(rows, cols),
                OutOfBoundsSnafu {
                    operand: term.name.clone(),
                    axis: "window",
                    range: rows,
                    bound: term.layout.bbox().to_string(),
                }
            );
        }
        Ok(())
    }

    /// `name + offset` of the window's top-left entry, reversed for transposed operands.
    pub fn pointer(term: &TensorDescription, top_left: (usize, usize), transpose: bool) -> Result<String> {
        let entry = if transpose { [top_left.1, top_left.0] } else { [top_left.0, top_left.1] };
        let offset = term.layout.subtensor_offset(&entry)?;
        Ok(if offset > 0 { format!("{} + {offset}", term.name) } else { term.name.clone() })
    }

    /// Pointers to the top-left entries of the A, B and C windows.
    pub fn pointers(&self) -> Result<(String, String, String)> {
        let (m, n, k) = self.mnk();
        Ok((
            Self::pointer(&self.left, (m.start, k.start), self.trans_a)?,
            Self::pointer(&self.right, (k.start, n.start), self.trans_b)?,
            Self::pointer(&self.result, (m.start, n.start), false)?,
        ))
    }
}
