//! GEMM descriptions, backend selection and the kernel adapters.
//!
//! A [`GemmDescription`] is routed once through [`select_backend`]; the resulting
//! [`GemmBackend`] decides which adapter writes the call site.

pub mod accelerator;
pub mod blas;
pub mod description;
pub mod fallback;
pub mod generator;
pub mod selector;

pub use accelerator::{AcceleratorKernel, AcceleratorService, Addressing, BatchedGemm, BatchedMatrix};
pub use description::{GemmDescription, Sparsity};
pub use generator::{ExternalGemmRoutine, routine_name, sparsity_hash};
pub use selector::{GemmBackend, select_backend};

use crate::error::*;
use crate::flops::Flops;
use crate::session::EmitContext;

/// Select a backend for `d` and emit it.
pub fn generate(d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<Flops> {
    let backend = select_backend(d, ctx.arch(), ctx.session.configuration())?;
    emit(&backend, d, ctx)
}

/// Emit `d` through an already selected backend.
pub fn emit(backend: &GemmBackend, d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<Flops> {
    let flops = match backend {
        GemmBackend::DirectCall(blas) => blas::generate(blas, d, ctx)?,
        GemmBackend::ExternalGenerator(generator) => generator::generate(generator, d, ctx)?,
        GemmBackend::AcceleratorBatched => accelerator::record(d, ctx)?,
        GemmBackend::Fallback => fallback::generate(d, ctx)?,
    };
    Ok(Flops::Exact(flops))
}
