//! GEMM routines produced by an external source generator.
//!
//! Structurally identical GEMMs map to the same routine name, so the generator runs
//! once per distinct shape no matter how often the shape is emitted.

use std::path::Path;

use snafu::ensure;
use xxhash_rust::xxh3::xxh3_64;

use crate::cache::RoutineGenerator;
use crate::config::{CodeGenerator, GeneratorMode};
use crate::error::*;
use crate::gemm::{GemmDescription, Sparsity};
use crate::session::EmitContext;
use crate::sink::CodeSink;
use crate::tool::{run_tool, write_matrix_market};

/// Prefetch mode with prefetch pointers passed to the routine.
pub const PREFETCH_L2_VIA_C: &str = "BL2viaC";
/// Prefetch arguments exist in the signature but are ignored.
pub const PREFETCH_SIGNATURE_ONLY: &str = "pfsigonly";

/// Every observable parameter of a generated routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GemmParameters {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub lda: usize,
    pub ldb: usize,
    pub ldc: usize,
    pub alpha: String,
    pub beta: String,
    pub aligned_a: bool,
    pub aligned_c: bool,
    pub trans_a: bool,
    pub trans_b: bool,
    pub prefetch: String,
}

impl GemmParameters {
    pub fn new(d: &GemmDescription, enable_prefetch: bool) -> Self {
        let (m, n, k) = d.mnk();
        let (lda, ldb, ldc) = d.leading_dimensions();
        let prefetch = if enable_prefetch && d.prefetch_name().is_some() {
            PREFETCH_L2_VIA_C
        } else {
            PREFETCH_SIGNATURE_ONLY
        };
        Self {
            m: m.size(),
            n: n.size(),
            k: k.size(),
            lda,
            ldb,
            ldc,
            alpha: d.alpha().alpha_class(),
            beta: d.beta().beta_class(),
            aligned_a: d.aligned_a(),
            aligned_c: d.aligned_c(),
            trans_a: d.trans_a(),
            trans_b: d.trans_b(),
            prefetch: prefetch.to_string(),
        }
    }
}

/// Hex digest of the coordinate list's `[(r, c), ...]` form.
pub fn sparsity_hash(entries: &[(usize, usize)]) -> String {
    format!("{:016x}", xxh3_64(format!("{entries:?}").as_bytes()))
}

/// Routine name: a pure function of the operation name, the parameters and the
/// sparsity coordinates.
pub fn routine_name(operation: &str, params: &GemmParameters, sparsity: Option<&[(usize, usize)]>) -> String {
    let mut name = operation.to_string();
    if let Some(entries) = sparsity {
        name.push_str("sparse_");
        name.push_str(&sparsity_hash(entries));
    }
    let flag = |b: bool| u8::from(b);
    name.push_str(&format!(
        "_m{}_n{}_k{}_ldA{}_ldB{}_ldC{}_alpha{}_beta{}_alignedA{}_alignedC{}",
        params.m,
        params.n,
        params.k,
        params.lda,
        params.ldb,
        params.ldc,
        params.alpha,
        params.beta,
        flag(params.aligned_a),
        flag(params.aligned_c),
    ));
    if params.trans_a || params.trans_b {
        name.push_str(&format!("_transA{}_transB{}", flag(params.trans_a), flag(params.trans_b)));
    }
    name.push('_');
    name.push_str(&params.prefetch);
    name
}

/// Deferred invocation of the external generator for one routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalGemmRoutine {
    pub generator: CodeGenerator,
    pub params: GemmParameters,
    pub sparsity: Option<Sparsity>,
    pub host_arch: String,
    pub precision: char,
    pub typename: &'static str,
}

impl ExternalGemmRoutine {
    /// Command line for writing routine `name` into `path`.
    pub fn arg_list(&self, name: &str, path: &Path, mtx: Option<&Path>) -> Vec<String> {
        let p = &self.params;
        let shape = [p.m, p.n, p.k, p.lda, p.ldb, p.ldc].map(|v| v.to_string());
        let file = path.display().to_string();

        let mut args = vec![self.generator.cmd.clone()];
        match self.generator.mode {
            GeneratorMode::Libxsmm => {
                let mode = if mtx.is_some() { "sparse" } else { "dense" };
                args.extend([mode.to_string(), file, name.to_string()]);
                args.extend(shape);
                args.extend([
                    p.alpha.clone(),
                    p.beta.clone(),
                    u8::from(p.aligned_a).to_string(),
                    u8::from(p.aligned_c).to_string(),
                    self.host_arch.clone(),
                    p.prefetch.clone(),
                    format!("{}P", self.precision),
                ]);
                args.extend(mtx.map(|m| m.display().to_string()));
            }
            GeneratorMode::Pspamm => {
                args.extend(shape);
                args.extend([p.alpha.clone(), p.beta.clone()]);
                for (flag, value) in [
                    ("--arch", self.host_arch.clone()),
                    ("--prefetching", p.prefetch.clone()),
                    ("--output_funcname", name.to_string()),
                    ("--output_filename", file),
                    ("--precision", self.precision.to_string()),
                ] {
                    args.extend([flag.to_string(), value]);
                }
                if let Some(mtx) = mtx {
                    args.extend(["--mtx_filename".to_string(), mtx.display().to_string()]);
                }
            }
        }
        args
    }

    /// Matrix Market extents of the sparse operand.
    fn matrix_shape(&self, sparsity: &Sparsity) -> (usize, usize) {
        let p = &self.params;
        let cols = if p.lda == 0 { p.k } else { p.n };
        let rows = match self.generator.mode {
            GeneratorMode::Pspamm => sparsity.rows,
            GeneratorMode::Libxsmm if p.lda == 0 => p.m,
            GeneratorMode::Libxsmm => p.k,
        };
        (rows, cols)
    }

    pub fn declaration(&self, name: &str) -> String {
        let t = self.typename;
        match self.generator.mode {
            GeneratorMode::Pspamm => format!(
                "void {name}(const {t}* A, const {t}* B, {t}* C, {t} alpha, {t} beta, const {t}* prefetch);"
            ),
            GeneratorMode::Libxsmm => format!(
                "void {name}(const {t}* A, const {t}* B, {t}* C, const {t}* A_prefetch, const {t}* B_prefetch, const {t}* C_prefetch);"
            ),
        }
    }
}

impl RoutineGenerator for ExternalGemmRoutine {
    /// The inputs of the routine name plus the tool and host settings.
    ///
    /// The allocated row count of a compressed operand is left out: routines sharing
    /// a name share their nonzeros, and the first registration writes the matrix.
    fn identity(&self) -> String {
        let entries = self.sparsity.as_ref().map(|s| s.entries.as_slice());
        format!(
            "{:?} {:?} {entries:?} {} {} {}",
            self.generator, self.params, self.host_arch, self.precision, self.typename
        )
    }

    fn header(&self, sink: &mut CodeSink) {
        sink.directive("#ifndef NDEBUG");
        sink.line("extern long long libxsmm_num_total_flops;");
        sink.line("extern long long pspamm_num_total_flops;");
        sink.directive("#endif");
        sink.directive("#if defined( __SSE3__) || defined(__MIC__)");
        sink.include_sys("immintrin.h");
        sink.directive("#endif");
    }

    fn generate(&self, name: &str, path: &Path) -> Result<String> {
        match &self.sparsity {
            Some(sparsity) => {
                let (rows, cols) = self.matrix_shape(sparsity);
                let mtx = write_matrix_market(rows, cols, &sparsity.entries)?;
                run_tool(&self.arg_list(name, path, Some(mtx.path())))?;
            }
            None => run_tool(&self.arg_list(name, path, None))?,
        }
        Ok(self.declaration(name))
    }
}

/// Register the routine for `d` and write its call site.
pub fn generate(generator: &CodeGenerator, d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<u64> {
    ensure!(!(d.trans_a() || d.trans_b()), TransposeUnsupportedSnafu { tool: generator.operation_name() });
    d.check_windows()?;

    let arch = ctx.arch();
    let params = GemmParameters::new(d, arch.enable_prefetch());
    let sparsity = d.sparsity();
    let name = routine_name(&generator.operation_name(), &params, sparsity.as_ref().map(|s| s.entries.as_slice()));
    let routine = ExternalGemmRoutine {
        generator: generator.clone(),
        params,
        sparsity,
        host_arch: arch.host_name().to_string(),
        precision: arch.precision(),
        typename: arch.typename(),
    };

    let (a, b, c) = d.pointers()?;
    let prefetch = d.prefetch_name().unwrap_or("nullptr");
    let call = match generator.mode {
        GeneratorMode::Libxsmm => format!("{name}({a}, {b}, {c}, nullptr, {prefetch}, nullptr);"),
        GeneratorMode::Pspamm => {
            let dtype = arch.dtype();
            format!("{name}({a}, {b}, {c}, {}, {}, {prefetch});", d.alpha().render(dtype), d.beta().render(dtype))
        }
    };

    ctx.session.cache_mut().register(name, Box::new(routine))?;
    ctx.sink.line(call);
    Ok(d.flops())
}
