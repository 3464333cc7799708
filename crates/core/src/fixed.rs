//! Fixed-point arithmetic implementation
//!
//! Provides a `Fixed` decimal for order quantities and prices. Values always
//! render in plain positional notation (`0.001`, never `1e-3`), which is the
//! only form the exchange accepts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Fixed-point decimal type for precise financial values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    /// Zero value
    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    /// One value
    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    /// Create a Fixed from an integer
    pub fn from_i64(value: i64) -> Self {
        Fixed {
            value: Decimal::from(value),
        }
    }

    /// Create a Fixed from a float.
    ///
    /// The shortest decimal that round-trips to the same `f64` is kept, so
    /// `0.001` stays `0.001` rather than its binary expansion.
    pub fn from_f64(value: f64) -> Result<Self, FixedError> {
        if !value.is_finite() {
            return Err(FixedError::NonFinite);
        }
        // f64's Display is shortest round-trip and always positional
        let decimal = Decimal::from_str(&value.to_string()).map_err(|_| FixedError::OutOfRange)?;
        Ok(Fixed { value: decimal })
    }

    /// Create a Fixed from a string. Scientific input (`1e-3`) is accepted.
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        let s = s.trim();
        let decimal = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| FixedError::InvalidValue(s.to_string()))?;
        Ok(Fixed { value: decimal })
    }

    /// Get the underlying Decimal value
    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Plain decimal text with trailing zeros removed: `50000.0` → `50000`.
    pub fn to_wire_string(&self) -> String {
        self.value.normalize().to_string()
    }

    /// Check if the value is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }
}

/// Fixed-point conversion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Value out of decimal range")]
    OutOfRange,
    #[error("Value is NaN or infinite")]
    NonFinite,
    #[error("Invalid decimal: {0}")]
    InvalidValue(String),
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}

/// Convenience macro for creating Fixed values
#[macro_export]
macro_rules! fixed {
    ($value:expr) => {
        $crate::fixed::Fixed::from_str_exact(stringify!($value)).unwrap()
    };
}
