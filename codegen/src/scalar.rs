//! Scalar factors of GEMM and product operations.

use std::fmt;

use logemm_dtype::ScalarDType;

/// `alpha` or `beta`: a literal known at generation time or a runtime symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Literal(f64),
    Symbol(String),
}

impl Scalar {
    pub const ZERO: Scalar = Scalar::Literal(0.0);
    pub const ONE: Scalar = Scalar::Literal(1.0);

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn is_one(&self) -> bool {
        self.special(&[1]).is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.special(&[0]).is_some()
    }

    /// The literal if it equals one of `specials` exactly.
    fn special(&self, specials: &[i8]) -> Option<i8> {
        match self {
            Self::Literal(value) => specials.iter().copied().find(|&s| f64::from(s) == *value),
            Self::Symbol(_) => None,
        }
    }

    /// Specialization class of an `alpha`: `1` or `generic`.
    pub fn alpha_class(&self) -> String {
        self.special(&[1]).map_or_else(|| "generic".to_string(), |s| s.to_string())
    }

    /// Specialization class of a `beta`: `0`, `1` or `generic`.
    pub fn beta_class(&self) -> String {
        self.special(&[0, 1]).map_or_else(|| "generic".to_string(), |s| s.to_string())
    }

    /// C expression for this scalar.
    pub fn render(&self, dtype: ScalarDType) -> String {
        match self {
            Self::Literal(value) => dtype.c_literal(*value),
            Self::Symbol(name) => name.clone(),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Scalar {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value:?}"),
            Self::Symbol(name) => write!(f, "{name}"),
        }
    }
}
