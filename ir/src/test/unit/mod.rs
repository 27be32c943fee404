pub mod bbox;
pub mod indices;
pub mod range;
pub mod tensor;
