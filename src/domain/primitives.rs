//! Domain primitives: Side, Position, wall-clock helper.

use serde::{Deserialize, Serialize};

/// Current wall-clock time in Unix epoch seconds (UTC).
///
/// Only consulted when a caller leaves an optional `now` unset.
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Resolve an optional caller-supplied timestamp against the wall clock.
pub(crate) fn resolve_now(now: Option<i64>) -> i64 {
    now.unwrap_or_else(now_secs)
}

/// Direction of a perpetual or spot exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn is_short(&self) -> bool {
        matches!(self, Side::Short)
    }

    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// A single perp/spot position snapshot. Never mutated; recompute from a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Size in base asset units (always a magnitude; direction lives in `side`).
    pub size: f64,
    pub side: Side,
    pub entry_price: f64,
    pub current_price: f64,
    pub leverage: f64,
}

impl Position {
    /// Signed notional at the current price: positive long, negative short.
    pub fn exposure_value(&self) -> f64 {
        self.side.sign() * self.size * self.current_price
    }
}
