//! Floating-point operation counts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Flop count of emitted code.
///
/// Batched accelerator products cannot be counted at generation time and report
/// `Unknown`; any sum involving an unknown count is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flops {
    Exact(u64),
    Unknown,
}

impl Flops {
    pub const ZERO: Flops = Flops::Exact(0);

    pub fn exact(self) -> Option<u64> {
        match self {
            Self::Exact(n) => Some(n),
            Self::Unknown => None,
        }
    }

    /// Count of a body repeated `factor` times.
    pub fn scaled(self, factor: u64) -> Self {
        match self {
            Self::Exact(n) => Self::Exact(n * factor),
            Self::Unknown => Self::Unknown,
        }
    }
}

impl Default for Flops {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Flops {
    type Output = Flops;

    fn add(self, rhs: Flops) -> Flops {
        match (self, rhs) {
            (Self::Exact(a), Self::Exact(b)) => Self::Exact(a + b),
            _ => Self::Unknown,
        }
    }
}

impl AddAssign for Flops {
    fn add_assign(&mut self, rhs: Flops) {
        *self = *self + rhs;
    }
}

impl Sum for Flops {
    fn sum<I: Iterator<Item = Flops>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Flops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
