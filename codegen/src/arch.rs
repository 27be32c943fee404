//! Target architecture descriptors.
//!
//! An architecture fixes the element type, the SIMD alignment used for aligned
//! GEMM variants, whether software prefetching is requested, and whether code runs
//! on the host or is batched into accelerator kernels.

use std::sync::Arc;

use bon::bon;
use logemm_dtype::ScalarDType;

use crate::error::*;
use crate::gemm::AcceleratorService;

/// Where generated kernels execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    Cpu,
    Gpu,
}

#[derive(Debug, Clone)]
pub struct Architecture {
    name: String,
    host_name: Option<String>,
    dtype: ScalarDType,
    /// SIMD alignment in bytes.
    alignment: usize,
    enable_prefetch: bool,
    target: Target,
    backend: String,
    accelerator: Option<Arc<dyn AcceleratorService>>,
}

#[bon]
impl Architecture {
    /// Create an architecture descriptor with builder pattern.
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        #[builder(default = ScalarDType::Float64)] dtype: ScalarDType,
        #[builder(default = 32)] alignment: usize,
        #[builder(default = false)] enable_prefetch: bool,
        #[builder(default = Target::Cpu)] target: Target,
        #[builder(into, default = "cpp".to_owned())] backend: String,
        #[builder(into)] host_name: Option<String>,
        accelerator: Option<Arc<dyn AcceleratorService>>,
    ) -> Self {
        Self { name, host_name, dtype, alignment, enable_prefetch, target, backend, accelerator }
    }
}

impl Architecture {
    /// Parse identifiers such as `dhsw` or `sskx`: a precision letter followed by a
    /// micro-architecture name.
    pub fn from_identifier(identifier: &str) -> Result<Self> {
        let mut chars = identifier.chars();
        let dtype = chars.next().and_then(ScalarDType::from_precision);
        let name = chars.as_str();
        let table = match name {
            "snb" | "hsw" | "rome" => Some((32, false)),
            "knl" | "skx" | "a64fx" => Some((64, true)),
            "thunderx2t99" | "neon" => Some((16, false)),
            _ => None,
        };
        match (dtype, table) {
            (Some(dtype), Some((alignment, enable_prefetch))) => {
                Ok(Self::builder().name(name).dtype(dtype).alignment(alignment).enable_prefetch(enable_prefetch).build())
            }
            _ => UnknownArchitectureSnafu { identifier }.fail(),
        }
    }

    /// Read `LOGEMM_ARCH` (default `dhsw`) and `LOGEMM_PREFETCH`.
    pub fn from_env() -> Result<Self> {
        let identifier = std::env::var("LOGEMM_ARCH").unwrap_or_else(|_| "dhsw".to_string());
        let mut arch = Self::from_identifier(&identifier)?;
        if let Some(enable) = std::env::var("LOGEMM_PREFETCH").ok().and_then(|s| s.parse().ok()) {
            arch.enable_prefetch = enable;
        }
        Ok(arch)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name handed to host-side code generators.
    pub fn host_name(&self) -> &str {
        self.host_name.as_deref().unwrap_or(&self.name)
    }

    pub fn dtype(&self) -> ScalarDType {
        self.dtype
    }

    pub fn typename(&self) -> &'static str {
        self.dtype.c_style()
    }

    pub fn precision(&self) -> char {
        self.dtype.precision()
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Alignment in elements.
    pub fn aligned_reals(&self) -> usize {
        (self.alignment / self.dtype.bytes()).max(1)
    }

    /// An element offset starts a SIMD-aligned address.
    pub fn check_alignment(&self, offset: usize) -> bool {
        offset % self.aligned_reals() == 0
    }

    pub fn enable_prefetch(&self) -> bool {
        self.enable_prefetch
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Operations are recorded into accelerator batches instead of host code.
    pub fn is_batched(&self) -> bool {
        self.target == Target::Gpu
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn accelerator(&self) -> Option<&Arc<dyn AcceleratorService>> {
        self.accelerator.as_ref()
    }

    pub fn has_accelerator(&self) -> bool {
        self.accelerator.is_some()
    }
}
