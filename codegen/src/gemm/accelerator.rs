//! Batched accelerator kernels.
//!
//! GEMMs on accelerator targets are recorded into the session batch instead of being
//! called directly. Once the kernel's result is final, the whole batch goes to the
//! architecture's [`AcceleratorService`], which returns one fused kernel and its
//! launcher. The launcher is called once with the arguments of every batched
//! operation.

use std::fmt;
use std::path::Path;

use logemm_ir::{BoundingBox, Range, TensorDescription};
use snafu::OptionExt;

use crate::arch::Architecture;
use crate::batch::{BatchEntry, EXTRA_OFFSET};
use crate::cache::{RoutineGenerator, append_to_file};
use crate::error::*;
use crate::gemm::GemmDescription;
use crate::session::EmitContext;
use crate::sink::CodeSink;

/// Kernel generation for accelerator batches.
pub trait AcceleratorService: fmt::Debug + Send + Sync {
    /// Produce one kernel for every operation in `batch`.
    ///
    /// Implementations report unsupported batches as
    /// [`Error::AcceleratorGeneration`].
    fn generate(&self, arch: &Architecture, batch: &[BatchEntry]) -> Result<AcceleratorKernel>;
}

/// Output of an [`AcceleratorService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorKernel {
    pub name: String,
    pub kernel: String,
    pub launcher: String,
    pub declaration: String,
    pub headers: Vec<String>,
}

/// How a batched kernel reaches an operand of instance `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Addressing {
    /// Compile-time constant, no runtime pointer.
    None,
    /// One buffer, instance `i` at `i * size`.
    Strided,
    /// Array of per-instance pointers.
    PointerBased,
}

impl Addressing {
    pub fn of(name: &str, is_compute_constant: bool, is_temporary: bool) -> Self {
        if is_compute_constant {
            Self::None
        } else if is_temporary || name.starts_with("_tmp") {
            Self::Strided
        } else {
            Self::PointerBased
        }
    }

    /// Launcher argument for `name`; strided temporaries live inside the kernel.
    pub fn argument(self, name: &str) -> Option<String> {
        match self {
            Self::None => Some(format!("{name}, 0")),
            Self::Strided => None,
            Self::PointerBased => Some(format!("{name}, {EXTRA_OFFSET}_{name}")),
        }
    }
}

/// One GEMM operand as the accelerator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchedMatrix {
    pub name: String,
    /// Window in stored orientation.
    pub rows: Range,
    pub cols: Range,
    pub bbox: BoundingBox,
    pub addressing: Addressing,
    pub transpose: bool,
    pub leading_dimension: usize,
}

impl BatchedMatrix {
    fn new(term: &TensorDescription, (rows, cols): (Range, Range), transpose: bool, leading_dimension: usize) -> Self {
        let (rows, cols) = if transpose { (cols, rows) } else { (rows, cols) };
        Self {
            name: term.name.clone(),
            rows,
            cols,
            bbox: term.layout.bbox().clone(),
            addressing: Addressing::of(&term.name, term.is_compute_constant, term.is_temporary),
            transpose,
            leading_dimension,
        }
    }

    pub fn argument(&self) -> Option<String> {
        self.addressing.argument(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct BatchedGemm {
    pub description: GemmDescription,
    pub a: BatchedMatrix,
    pub b: BatchedMatrix,
    pub c: BatchedMatrix,
    pub arguments: Vec<String>,
}

/// Append `d` to the session batch.
pub fn record(d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<u64> {
    d.check_windows()?;
    let (m, n, k) = d.mnk();
    let (lda, ldb, ldc) = d.leading_dimensions();

    let a = BatchedMatrix::new(d.left(), (m, k), d.trans_a(), lda);
    let b = BatchedMatrix::new(d.right(), (k, n), d.trans_b(), ldb);
    let c = BatchedMatrix::new(d.result(), (m, n), false, ldc);
    let arguments = [&a, &b, &c].into_iter().filter_map(BatchedMatrix::argument).collect();

    ctx.session.batch_mut().push(BatchEntry::Gemm(Box::new(BatchedGemm {
        description: d.clone(),
        a,
        b,
        c,
        arguments,
    })));
    Ok(d.flops())
}

/// Turn the session batch into one kernel and write its launcher call.
///
/// The batch is empty afterwards. On error the caller's guard empties it.
pub fn flush(ctx: &mut EmitContext<'_>) -> Result<()> {
    let arch = ctx.session.arch();
    let service = arch.accelerator().context(AcceleratorUnavailableSnafu { arch: arch.name() })?;
    let kernel = service.generate(arch, ctx.session.batch().entries())?;
    let arguments = ctx.session.batch().call_arguments();

    tracing::debug!(
        kernel.name = %kernel.name,
        batch.len = ctx.session.batch().len(),
        kernel.args = arguments.len(),
        "accelerator batch flushed"
    );

    ctx.sink.line(format!("{}({});", kernel.name, arguments.join(", ")));
    ctx.session.cache_mut().register(kernel.name.clone(), Box::new(AcceleratorRoutine { kernel }))?;
    ctx.session.batch_mut().clear();
    Ok(())
}

/// Cached accelerator kernel, written verbatim at flush time.
#[derive(Debug)]
pub struct AcceleratorRoutine {
    kernel: AcceleratorKernel,
}

impl RoutineGenerator for AcceleratorRoutine {
    fn identity(&self) -> String {
        format!("{}\n{}\n{}", self.kernel.name, self.kernel.kernel, self.kernel.launcher)
    }

    fn header(&self, sink: &mut CodeSink) {
        for header in &self.kernel.headers {
            sink.include(header);
        }
    }

    fn generate(&self, _name: &str, path: &Path) -> Result<String> {
        append_to_file(path, &format!("{}\n{}\n", self.kernel.kernel, self.kernel.launcher))?;
        Ok(self.kernel.declaration.clone())
    }
}
