//! Lossless decimal amount backed by rust_decimal.
//!
//! Human-readable token amounts cross into the engine as `Decimal`; the rate
//! math itself runs on `f64`, so this type carries the explicit bridge between
//! the two.

use crate::error::{EngineError, Result};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal amount (e.g. "1500.25" USDe).
///
/// Serializes to a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse without going through a float.
    pub fn from_str_canonical(s: &str) -> Result<Self> {
        RustDecimal::from_str(s.trim())
            .map(Decimal)
            .map_err(|e| EngineError::InvalidAmount(format!("{:?}: {}", s, e)))
    }

    /// Nearest decimal to a projection result; NaN and infinities are rejected.
    pub fn from_f64(value: f64) -> Result<Self> {
        RustDecimal::from_f64(value)
            .map(Decimal)
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!("{} has no decimal representation", value))
            })
    }

    /// Lossy view for projection math.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Plain digits, no exponent, no trailing fractional zeros.
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}
