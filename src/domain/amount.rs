//! Integer base-unit amounts and the explicit conversion to/from decimal text.
//!
//! On-chain balances arrive as unsigned 256-bit integers scaled by
//! `10^decimals`. Moving between that representation and a human amount is
//! always an explicit call here, never an implicit cast.

use crate::domain::Decimal;
use crate::error::{EngineError, Result};
use ethnum::U256;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest supported token precision.
pub const MAX_DECIMALS: u8 = 36;

/// Non-negative amount in integer base units (wei-equivalent).
///
/// Serializes as a decimal string so no JSON consumer truncates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BaseUnits(U256);

impl BaseUnits {
    pub const ZERO: BaseUnits = BaseUnits(U256::ZERO);

    pub fn new(value: U256) -> Self {
        BaseUnits(value)
    }

    pub fn from_u128(value: u128) -> Self {
        BaseUnits(U256::new(value))
    }

    pub fn inner(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    /// `self - rhs`, clamped at zero.
    pub fn saturating_sub(self, rhs: BaseUnits) -> Self {
        BaseUnits(self.0.checked_sub(rhs.0).unwrap_or(U256::ZERO))
    }

    /// `self * numerator / denominator`, rounded down.
    ///
    /// The caller guarantees `denominator` is non-zero.
    pub(crate) fn mul_div_floor(
        self,
        numerator: BaseUnits,
        denominator: BaseUnits,
    ) -> Result<Self> {
        let product = self.0.checked_mul(numerator.0).ok_or_else(|| {
            EngineError::Overflow(format!("{} * {} exceeds 256 bits", self, numerator))
        })?;
        Ok(BaseUnits(product / denominator.0))
    }

    /// Lossy float view for projection math.
    pub fn to_f64(&self, decimals: u8) -> Result<f64> {
        let text = format_units(*self, decimals)?;
        text.parse::<f64>()
            .map_err(|e| EngineError::InvalidAmount(format!("{}: {}", text, e)))
    }

    /// Lossless view as a `Decimal`; fails when the integer part is too wide
    /// for the 96-bit decimal mantissa.
    pub fn to_decimal(&self, decimals: u8) -> Result<Decimal> {
        let text = format_units(*self, decimals)?;
        Ok(Decimal::new(RustDecimal::from_str(&text)?))
    }

    pub fn from_decimal(value: Decimal, decimals: u8) -> Result<Self> {
        if value.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "{} is negative",
                value
            )));
        }
        parse_units(&value.to_canonical_string(), decimals)
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BaseUnits> for String {
    fn from(value: BaseUnits) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for BaseUnits {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        parse_units(&value, 0)
    }
}

impl From<u128> for BaseUnits {
    fn from(value: u128) -> Self {
        BaseUnits::from_u128(value)
    }
}

fn check_decimals(decimals: u8) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(EngineError::DecimalsOutOfRange(decimals));
    }
    Ok(())
}

/// Parse a non-negative decimal string into base units scaled by `10^decimals`.
///
/// Accepts "1000", "1.5" and ".25"; rejects signs, exponents and more
/// fractional digits than `decimals` allows.
pub fn parse_units(text: &str, decimals: u8) -> Result<BaseUnits> {
    check_decimals(decimals)?;
    let trimmed = text.trim();

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(EngineError::InvalidAmount(format!("{:?} has no digits", text)));
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidAmount(format!(
            "{:?} is not a plain non-negative decimal",
            text
        )));
    }
    if frac_part.len() > decimals as usize {
        return Err(EngineError::InvalidAmount(format!(
            "{:?} has more than {} decimal places",
            text, decimals
        )));
    }

    let padding = decimals as usize - frac_part.len();
    let ten = U256::new(10);
    let mut value = U256::ZERO;
    let digits = int_part
        .bytes()
        .chain(frac_part.bytes())
        .chain(std::iter::repeat(b'0').take(padding));

    for digit in digits {
        value = value
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::new(u128::from(digit - b'0'))))
            .ok_or_else(|| EngineError::Overflow(format!("{:?} exceeds 256 bits", text)))?;
    }

    Ok(BaseUnits(value))
}

/// Render base units as decimal text with no trailing fractional zeros.
pub fn format_units(value: BaseUnits, decimals: u8) -> Result<String> {
    check_decimals(decimals)?;
    let digits = value.0.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return Ok(digits);
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{}.{}", int_part, frac_part))
    }
}
