//! Scalar element types for generated kernels.
//!
//! Kernels only ever operate on one floating-point type per architecture, so this
//! crate is intentionally narrow: it maps the element type to its C spelling, its
//! size in bytes, and the single-letter precision tag expected by external kernel
//! generators.


/// Floating-point element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::EnumCount, strum::VariantArray)]
pub enum ScalarDType {
    #[strum(to_string = "f32")]
    Float32,
    #[strum(to_string = "f64")]
    Float64,
}

impl ScalarDType {
    /// Size of one element in bytes.
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// C/C++ spelling of the element type.
    pub const fn c_style(&self) -> &'static str {
        match self {
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Precision tag used by architecture identifiers and generator tools (`S`/`D`).
    pub const fn precision(&self) -> char {
        match self {
            Self::Float32 => 'S',
            Self::Float64 => 'D',
        }
    }

    /// Parse the lower-case precision prefix of an architecture identifier.
    pub const fn from_precision(tag: char) -> Option<Self> {
        match tag {
            's' | 'S' => Some(Self::Float32),
            'd' | 'D' => Some(Self::Float64),
            _ => None,
        }
    }

    /// Render a literal of this type as C source.
    pub fn c_literal(&self, value: f64) -> String {
        let body = if value.fract() == 0.0 && value.abs() < 1e15 { format!("{value:.1}") } else { format!("{value:e}") };
        match self {
            Self::Float32 => format!("{body}f"),
            Self::Float64 => body,
        }
    }
}
