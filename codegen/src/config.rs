//! GEMM capability table.
//!
//! Each architecture lists the GEMM tools it can use. For a concrete GEMM every tool
//! reports whether it supports the shape and how much it would like to handle it; the
//! most preferred supporting tool wins, ties going to the earlier table entry.

use crate::arch::{Architecture, Target};
use crate::scalar::Scalar;

/// How strongly a tool wants a GEMM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum Preference {
    Lowest,
    Low,
    Moderate,
    High,
    Highest,
}

/// Everything a tool may look at when deciding support.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmQuery {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub sparse_a: bool,
    pub sparse_b: bool,
    pub trans_a: bool,
    pub trans_b: bool,
    pub alpha: Scalar,
    pub beta: Scalar,
    pub aligned_a: bool,
    pub aligned_c: bool,
    pub target: Target,
}

impl GemmQuery {
    fn is_sparse(&self) -> bool {
        self.sparse_a || self.sparse_b
    }

    fn is_transposed(&self) -> bool {
        self.trans_a || self.trans_b
    }

    /// Geometric mean of the GEMM extents.
    fn mean_extent(&self) -> f64 {
        ((self.m * self.n * self.k) as f64).cbrt()
    }
}

/// A library routine with the CBLAS calling convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlasLike {
    pub name: String,
    pub operation_name: String,
    pub includes: Vec<String>,
}

impl BlasLike {
    pub fn mkl(arch: &Architecture) -> Self {
        Self {
            name: "MKL".to_string(),
            operation_name: format!("cblas_{}gemm", arch.precision().to_ascii_lowercase()),
            includes: vec!["mkl_cblas.h".to_string()],
        }
    }

    pub fn openblas(arch: &Architecture) -> Self {
        Self {
            name: "OpenBLAS".to_string(),
            operation_name: format!("cblas_{}gemm", arch.precision().to_ascii_lowercase()),
            includes: vec!["cblas.h".to_string()],
        }
    }

    /// Column-major call statement.
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &self,
        trans_a: bool,
        trans_b: bool,
        (m, n, k): (usize, usize, usize),
        alpha: &str,
        (a, lda): (&str, usize),
        (b, ldb): (&str, usize),
        beta: &str,
        (c, ldc): (&str, usize),
    ) -> String {
        let trans = |t: bool| if t { "CblasTrans" } else { "CblasNoTrans" };
        format!(
            "{}(CblasColMajor, {}, {}, {m}, {n}, {k}, {alpha}, {a}, {lda}, {b}, {ldb}, {beta}, {c}, {ldc});",
            self.operation_name,
            trans(trans_a),
            trans(trans_b),
        )
    }
}

/// Calling convention and argument layout of an external generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum GeneratorMode {
    /// Positional arguments, `dense`/`sparse` mode keyword.
    Libxsmm,
    /// Flag arguments, sparse right operand via `--mtx_filename`.
    Pspamm,
}

/// A command-line tool that writes GEMM kernels as C source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerator {
    pub mode: GeneratorMode,
    pub cmd: String,
    /// Mean extent above which the tool stops being preferred.
    pub threshold: usize,
}

impl CodeGenerator {
    pub fn libxsmm(cmd: impl Into<String>) -> Self {
        Self { mode: GeneratorMode::Libxsmm, cmd: cmd.into(), threshold: 128 }
    }

    pub fn pspamm(cmd: impl Into<String>) -> Self {
        Self { mode: GeneratorMode::Pspamm, cmd: cmd.into(), threshold: 128 }
    }

    /// Routine name prefix.
    pub fn operation_name(&self) -> String {
        self.mode.to_string()
    }
}

/// One entry of the capability table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GemmTool {
    Blas(BlasLike),
    Generator(CodeGenerator),
    /// Batched kernels produced by the architecture's accelerator service.
    ///
    /// Only valid on accelerator targets; the selector rejects it elsewhere.
    Accelerator,
}

impl GemmTool {
    pub fn name(&self) -> String {
        match self {
            Self::Blas(blas) => blas.name.clone(),
            Self::Generator(generator) => generator.operation_name(),
            Self::Accelerator => "accelerator".to_string(),
        }
    }

    pub fn is_accelerator(&self) -> bool {
        matches!(self, Self::Accelerator)
    }

    pub fn supports(&self, q: &GemmQuery) -> bool {
        match self {
            Self::Blas(_) => !q.is_sparse() && q.target == Target::Cpu,
            Self::Generator(g) => match g.mode {
                GeneratorMode::Libxsmm => {
                    !(q.sparse_a && q.sparse_b)
                        && !q.is_transposed()
                        && q.alpha.is_one()
                        && (q.beta.is_zero() || q.beta.is_one())
                        && q.target == Target::Cpu
                }
                GeneratorMode::Pspamm => !q.sparse_a && !q.is_transposed() && q.target == Target::Cpu,
            },
            Self::Accelerator => !q.is_sparse(),
        }
    }

    pub fn preference(&self, q: &GemmQuery) -> Preference {
        match self {
            Self::Blas(_) => Preference::Moderate,
            Self::Generator(g) => match g.mode {
                GeneratorMode::Libxsmm if q.is_sparse() => Preference::Low,
                GeneratorMode::Libxsmm if q.mean_extent() <= g.threshold as f64 => Preference::High,
                GeneratorMode::Pspamm if q.sparse_b => Preference::High,
                GeneratorMode::Pspamm if q.mean_extent() <= g.threshold as f64 => Preference::Moderate,
                _ => Preference::Low,
            },
            Self::Accelerator => Preference::High,
        }
    }
}

/// Ordered capability table of one architecture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GemmConfiguration {
    tools: Vec<GemmTool>,
}

impl GemmConfiguration {
    pub fn new(tools: Vec<GemmTool>) -> Self {
        Self { tools }
    }

    /// Default tools per micro-architecture.
    pub fn default_for(arch: &Architecture) -> Self {
        if arch.target() == Target::Gpu {
            return Self::new(vec![GemmTool::Accelerator]);
        }
        let libxsmm = || GemmTool::Generator(CodeGenerator::libxsmm("libxsmm_gemm_generator"));
        let pspamm = || GemmTool::Generator(CodeGenerator::pspamm("pspamm.py"));
        let mkl = || GemmTool::Blas(BlasLike::mkl(arch));
        let openblas = || GemmTool::Blas(BlasLike::openblas(arch));

        let tools = match arch.name() {
            "snb" | "hsw" | "rome" => vec![libxsmm(), mkl()],
            "knl" | "skx" => vec![libxsmm(), pspamm(), mkl()],
            "thunderx2t99" | "a64fx" | "neon" => vec![pspamm(), openblas()],
            _ => vec![openblas()],
        };
        Self::new(tools)
    }

    pub fn tools(&self) -> &[GemmTool] {
        &self.tools
    }

    /// Most preferred tool supporting `query`.
    ///
    /// Accelerator tools are skipped when no accelerator service is available.
    pub fn get_gemm_tool(&self, query: &GemmQuery, accelerator_available: bool) -> Option<&GemmTool> {
        self.tools
            .iter()
            .filter(|tool| accelerator_available || !tool.is_accelerator())
            .filter(|tool| tool.supports(query))
            .fold(None, |best: Option<(&GemmTool, Preference)>, tool| {
                let preference = tool.preference(query);
                match best {
                    Some((_, current)) if current >= preference => best,
                    _ => Some((tool, preference)),
                }
            })
            .map(|(tool, _)| tool)
    }
}
