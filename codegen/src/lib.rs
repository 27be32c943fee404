//! Kernel generation for Loop-over-GEMM contractions.
//!
//! This crate turns GEMM, LoG and product descriptions into C/C++ call sites and
//! generated routines for a target architecture.
//!
//! # Architecture
//!
//! - **Session**: owns the architecture, capability table, routine cache and
//!   accelerator batch (`session`, `batch`, `cache`)
//! - **GEMM**: description, backend selection and the direct-call, external
//!   generator, accelerator and fallback adapters (`gemm`)
//! - **LoG / product**: loop nests around GEMMs and scalar products (`log`, `product`)
//!
//! # Usage
//!
//! ```ignore
//! use logemm_codegen::{Architecture, CodeSink, Session};
//!
//! let mut session = Session::new(Architecture::from_identifier("dhsw")?);
//! let mut sink = CodeSink::new();
//! let flops = session.generate_log(&mut sink, &description)?;
//! session.finish(Path::new("kernels.cpp"), &mut header)?;
//! ```

pub mod arch;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod flops;
pub mod gemm;
pub mod log;
pub mod loops;
pub mod product;
pub mod scalar;
pub mod session;
pub mod sink;
pub mod tool;
pub mod zero;

#[cfg(test)]
pub mod test;

pub use arch::{Architecture, Target};
pub use batch::{Batch, BatchEntry, BatchGuard, PointerRebase};
pub use cache::{RoutineCache, RoutineGenerator};
pub use config::{BlasLike, CodeGenerator, GemmConfiguration, GemmQuery, GemmTool, GeneratorMode, Preference};
pub use error::*;
pub use flops::Flops;
pub use gemm::{AcceleratorKernel, AcceleratorService, GemmBackend, GemmDescription, select_backend};
pub use log::LogDescription;
pub use product::ProductDescription;
pub use scalar::Scalar;
pub use session::{EmitContext, Session};
pub use sink::CodeSink;
