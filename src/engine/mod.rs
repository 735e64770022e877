//! Pure calculators, one module per component.
//!
//! No module depends on another; they share only the value types in
//! `crate::domain`. Nothing here performs I/O or holds state, so every
//! function is safe to call from any thread.

pub mod cooldown;
pub mod delta_neutral;
pub mod sats;
pub mod yield_converter;

pub use cooldown::{CooldownPhase, CooldownStatus, CooldownValidation, CooldownWindow};
pub use delta_neutral::{
    Allocation, CounterpartyRisk, ExchangeCapacity, ExchangeExposure, PositionPnl,
    PositionSummary, RebalanceAction, RebalanceCheck, RebalancePlan, RebalancePolicy,
};
pub use sats::{Activity, ActivityType, RankChange, RankDirection, SatsBalance, Tier, TierInfo};
pub use yield_converter::{EarningsProjection, YieldSource};
