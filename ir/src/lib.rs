//! Operand model for Loop-over-GEMM code generation.
//!
//! # Module Organization
//!
//! - [`range`] / [`bbox`] - interval and bounding-box algebra
//! - [`indices`] - named tensor indices
//! - [`pattern`] - structural-nonzero patterns
//! - [`layout`] - dense and compressed memory layouts
//! - [`tensor`] - operand descriptions
//! - [`projection`] - N-D to 2-D operand projection

pub mod bbox;
pub mod error;
pub mod indices;
pub mod layout;
pub mod pattern;
pub mod projection;
pub mod range;
pub mod tensor;


use std::collections::BTreeMap;

pub use bbox::BoundingBox;
pub use error::{Error, Result};
pub use indices::{Indices, loop_variable};
pub use layout::{CscLayout, DenseLayout, MemoryLayout};
pub use pattern::SparsityPattern;
pub use range::Range;
pub use tensor::{IndexedTensorDescription, TensorDescription, loop_ranges_contained, loop_ranges_equal};

pub use logemm_dtype::ScalarDType;

/// Range of each loop index, keyed by index name.
pub type LoopRanges = BTreeMap<char, Range>;
