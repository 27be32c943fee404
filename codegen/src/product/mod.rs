//! Element-wise and outer products, `result (+)= alpha * left * right`.

pub mod description;
pub mod engine;

pub use description::ProductDescription;
pub use engine::{BatchedProduct, generate};
