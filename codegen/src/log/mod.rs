//! Loop over GEMM.
//!
//! A contraction of arbitrary rank is written as loops around a single 2-D GEMM.
//! Indices that appear in the result but are not GEMM dimensions become outer loops;
//! indices summed over outside the GEMM become inner loops, whose first iteration is
//! peeled to assign instead of accumulate.

pub mod description;
pub mod engine;

pub use description::{LogDescription, LogPhase, peel};
pub use engine::generate;
