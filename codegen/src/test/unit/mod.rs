pub mod arch;
pub mod flops;
pub mod gemm;
pub mod generator;
