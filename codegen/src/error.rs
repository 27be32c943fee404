//! Error types for kernel generation.

use std::path::PathBuf;

use logemm_ir::Range;
use snafu::Snafu;

use crate::arch::Target;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while decomposing and emitting kernels.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Error from the operand model.
    #[snafu(display("IR error: {source}"), context(false))]
    Ir { source: logemm_ir::Error },

    /// Operand loop ranges are inconsistent.
    #[snafu(display("Loop range mismatch in {operation}: {reason}"))]
    LoopRangeMismatch { operation: String, reason: String },

    /// A loop index has no range in any operand.
    #[snafu(display("Loop index '{index}' has no range"))]
    MissingLoopRange { index: char },

    /// Both GEMM operands are compressed.
    #[snafu(display("GEMM {left} x {right}: sparse x sparse is not supported"))]
    SparseTimesSparse { left: String, right: String },

    /// Projected GEMM operand is not a matrix.
    #[snafu(display("GEMM operand {name} has rank {rank}, expected 2"))]
    OperandRank { name: String, rank: usize },

    /// A GEMM window leaves the operand.
    #[snafu(display("{axis} range {range} of {operand} exceeds {bound}"))]
    OutOfBounds { operand: String, axis: String, range: Range, bound: String },

    /// Operation requires a dense operand.
    #[snafu(display("{operation} requires a dense layout for {name}"))]
    CompressedOperand { name: String, operation: String },

    /// Tool cannot handle transposed operands.
    #[snafu(display("{tool} does not support transposed operands"))]
    TransposeUnsupported { tool: String },

    /// Tool does not match the compilation target.
    #[snafu(display("{tool} cannot be used on target {target}"))]
    TargetMismatch { tool: String, target: Target },

    /// Architecture identifier not recognized.
    #[snafu(display("Unknown architecture identifier '{identifier}'"))]
    UnknownArchitecture { identifier: String },

    /// External generator executable could not be started.
    #[snafu(display(
        "GEMM code generator executable \"{command}\" not found: {source}. \
         Make sure to add the folder containing the executable to your PATH."
    ))]
    ToolNotFound { command: String, source: std::io::Error },

    /// External generator exited with a failure status.
    #[snafu(display("GEMM code generator \"{command}\" failed ({status}):\n{stderr}"))]
    ToolFailed { command: String, status: String, stderr: String },

    /// File I/O failed.
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io { path: PathBuf, source: std::io::Error },

    /// The accelerator target has no kernel generation service.
    #[snafu(display("Architecture {arch} has no accelerator service"))]
    AcceleratorUnavailable { arch: String },

    /// The accelerator service rejected the batch.
    #[snafu(display("Accelerator kernel generation failed: {reason}"))]
    AcceleratorGeneration { reason: String },

    /// A batched kernel needs a GEMM the accelerator cannot express.
    #[snafu(display("{backend} GEMM selected inside a batched kernel: {reason}"))]
    UnsupportedAcceleratorShape { backend: String, reason: String },

    /// Two different routines claim the same name.
    #[snafu(display("Routine {name} is already registered with a different generator"))]
    RoutineConflict { name: String },

    /// The routine cache was already written out.
    #[snafu(display("Routine cache has already been flushed"))]
    AlreadyFlushed,

    /// Session finished with accelerator operations still batched.
    #[snafu(display("{entries} batched accelerator entries were never flushed"))]
    PendingBatch { entries: usize },
}
