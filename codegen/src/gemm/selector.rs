//! GEMM backend selection.

use snafu::ensure;

use crate::arch::{Architecture, Target};
use crate::config::{BlasLike, CodeGenerator, GemmConfiguration, GemmTool};
use crate::error::*;
use crate::gemm::GemmDescription;

/// Execution strategy of one GEMM.
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
pub enum GemmBackend {
    /// Call into an existing library routine.
    DirectCall(BlasLike),
    /// Generate a specialized routine with an external tool.
    ExternalGenerator(CodeGenerator),
    /// Record into the session batch for the accelerator service.
    AcceleratorBatched,
    /// Plain C loops.
    Fallback,
}

impl GemmBackend {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Pick the backend for `d` from `configuration`.
///
/// Dense operands need a unit stride on their first axis, otherwise only the portable
/// loops apply. Batched targets accept nothing but the accelerator.
pub fn select_backend(
    d: &GemmDescription,
    arch: &Architecture,
    configuration: &GemmConfiguration,
) -> Result<GemmBackend> {
    let unit_stride = |term: &logemm_ir::TensorDescription, exempt: bool| exempt || term.layout.stride(0) == 1;
    let conforming = unit_stride(d.left(), d.is_a_csc())
        && unit_stride(d.right(), d.is_b_csc())
        && unit_stride(d.result(), false);

    let backend = if !conforming {
        GemmBackend::Fallback
    } else {
        let query = d.query(arch.target());
        match configuration.get_gemm_tool(&query, arch.has_accelerator()) {
            None => GemmBackend::Fallback,
            Some(GemmTool::Blas(blas)) => GemmBackend::DirectCall(blas.clone()),
            Some(GemmTool::Generator(generator)) => GemmBackend::ExternalGenerator(generator.clone()),
            Some(tool @ GemmTool::Accelerator) => {
                if arch.target() != Target::Gpu {
                    return TargetMismatchSnafu { tool: tool.name(), target: arch.target() }.fail();
                }
                GemmBackend::AcceleratorBatched
            }
        }
    };

    if arch.is_batched() && backend != GemmBackend::AcceleratorBatched {
        ensure!(arch.has_accelerator(), AcceleratorUnavailableSnafu { arch: arch.name() });
        let reason = if !conforming {
            "the accelerator requires unit stride on the leading axis"
        } else if d.is_a_csc() || d.is_b_csc() {
            "the accelerator does not take compressed operands"
        } else {
            "no configured tool targets the accelerator"
        };
        return UnsupportedAcceleratorShapeSnafu { backend: backend.name(), reason }.fail();
    }

    let (m, n, k) = d.mnk();
    tracing::debug!(
        gemm.backend = backend.name(),
        gemm.m = %m,
        gemm.n = %n,
        gemm.k = %k,
        gemm.sparse_a = d.is_a_csc(),
        gemm.sparse_b = d.is_b_csc(),
        "GEMM backend selected"
    );
    Ok(backend)
}
