use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Decimals out of range (0..=36): {0}")]
    DecimalsOutOfRange(u8),
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject NaN and infinite inputs before they reach the rate math.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::InvalidArgument(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

impl From<rust_decimal::Error> for EngineError {
    fn from(err: rust_decimal::Error) -> Self {
        EngineError::Overflow(err.to_string())
    }
}
