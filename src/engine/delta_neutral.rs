//! Hedge-state analytics for a spot-long / perp-short book.
//!
//! Perp values are signed: a short perp is negative. A delta of 0 is fully
//! hedged, positive is net long, negative is over-hedged.

use crate::domain::{Position, Side};
use crate::error::{ensure_finite, EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_DELTA_TOLERANCE: f64 = 0.01;
pub const DEFAULT_REBALANCE_THRESHOLD: f64 = 0.02;
pub const DEFAULT_REBALANCE_MAX_INTERVAL_SECS: i64 = 86_400;
/// Three 8-hour funding settlements a day.
pub const DEFAULT_FUNDING_INTERVALS_PER_YEAR: u32 = 1095;
pub const DEFAULT_MAINTENANCE_MARGIN: f64 = 0.005;
pub const DEFAULT_BASE_SLIPPAGE: f64 = 0.001;

/// Rebalances smaller than this fraction of spot value are noise.
const REBALANCE_DUST_FRACTION: f64 = 0.001;
/// Price impact per unit of size/liquidity in the linear slippage model.
const SLIPPAGE_IMPACT_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceAction {
    None,
    IncreaseShort,
    DecreaseShort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancePlan {
    pub action: RebalanceAction,
    /// Magnitude of the perp notional change.
    pub amount: f64,
    pub current_delta: f64,
    pub target_perp_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPnl {
    pub pnl: f64,
    pub pnl_percent: f64,
}

/// Exposure held on one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeExposure {
    pub exchange: String,
    /// Signed notional; only its magnitude counts toward concentration.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeShare {
    pub exchange: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartyRisk {
    pub exposures: Vec<ExchangeShare>,
    /// Herfindahl-Hirschman index over fractional shares, in [1/n, 1].
    pub concentration: f64,
    pub largest_exposure: Option<String>,
}

/// Venue capacity used by the allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeCapacity {
    pub exchange: String,
    pub liquidity: f64,
    pub max_position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub exchange: String,
    pub amount: f64,
}

/// When a hedge is due for a rebalance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalancePolicy {
    pub threshold: f64,
    pub max_interval_secs: i64,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REBALANCE_THRESHOLD,
            max_interval_secs: DEFAULT_REBALANCE_MAX_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceCheck {
    pub needed: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub total_long: f64,
    pub total_short: f64,
    pub net_position: f64,
    pub weighted_entry_price: f64,
    pub aggregate_pnl: f64,
}

/// `(spot + perp) / spot`; 0 when there is no spot leg.
pub fn calculate_delta(spot_value: f64, perp_value: f64) -> f64 {
    if spot_value == 0.0 {
        debug!(perp_value, "zero spot value, delta reported as 0");
        return 0.0;
    }
    (spot_value + perp_value) / spot_value
}

/// Short notional over spot notional, both taken as magnitudes.
pub fn calculate_hedge_ratio(short_magnitude: f64, spot_value: f64) -> f64 {
    if spot_value == 0.0 {
        debug!(short_magnitude, "zero spot value, hedge ratio reported as 0");
        return 0.0;
    }
    short_magnitude.abs() / spot_value.abs()
}

pub fn is_delta_neutral(delta: f64, tolerance: f64) -> bool {
    delta.abs() <= tolerance
}

/// Perp adjustment needed to move the book to `target_delta`.
pub fn calculate_rebalance_amount(
    spot_value: f64,
    perp_value: f64,
    target_delta: f64,
) -> RebalancePlan {
    let target_perp_value = spot_value * (target_delta - 1.0);
    let rebalance_delta = target_perp_value - perp_value;
    let current_delta = calculate_delta(spot_value, perp_value);

    let action = if rebalance_delta.abs() < spot_value.abs() * REBALANCE_DUST_FRACTION {
        RebalanceAction::None
    } else if rebalance_delta < 0.0 {
        RebalanceAction::IncreaseShort
    } else {
        RebalanceAction::DecreaseShort
    };

    let amount = match action {
        RebalanceAction::None => 0.0,
        _ => rebalance_delta.abs(),
    };

    RebalancePlan {
        action,
        amount,
        current_delta,
        target_perp_value,
    }
}

/// `(1 + rate)^intervals - 1`, compounding each funding interval directly.
///
/// Kept distinct from `yield_converter::funding_rate_to_apy`, which compounds
/// a daily-scaled rate instead; callers depend on both figures.
pub fn calculate_annualized_funding(rate: f64, intervals_per_year: u32) -> f64 {
    (1.0 + rate).powf(f64::from(intervals_per_year)) - 1.0
}

pub fn calculate_position_pnl(
    entry_price: f64,
    current_price: f64,
    size: f64,
    side: Side,
) -> PositionPnl {
    let price_diff = current_price - entry_price;
    let pnl = if side.is_short() {
        -price_diff * size
    } else {
        price_diff * size
    };

    let cost_basis = entry_price * size;
    let pnl_percent = if cost_basis == 0.0 {
        0.0
    } else {
        pnl / cost_basis * 100.0
    };

    PositionPnl { pnl, pnl_percent }
}

/// Price at which maintenance margin is breached.
pub fn calculate_liquidation_price(
    entry_price: f64,
    leverage: f64,
    side: Side,
    maintenance_margin: f64,
) -> Result<f64> {
    let entry_price = ensure_finite("entry_price", entry_price)?;
    let leverage = ensure_finite("leverage", leverage)?;
    if leverage <= 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "leverage must be > 0, got {}",
            leverage
        )));
    }
    let maintenance_margin = ensure_finite("maintenance_margin", maintenance_margin)?;

    let margin_ratio = 1.0 / leverage;
    let price = match side {
        Side::Long => entry_price * (1.0 - margin_ratio + maintenance_margin),
        Side::Short => entry_price * (1.0 + margin_ratio - maintenance_margin),
    };
    Ok(price)
}

/// Share of absolute exposure per exchange plus its HHI concentration.
pub fn calculate_counterparty_risk(positions: &[ExchangeExposure]) -> CounterpartyRisk {
    let mut by_exchange: BTreeMap<&str, f64> = BTreeMap::new();
    for position in positions {
        *by_exchange.entry(position.exchange.as_str()).or_insert(0.0) += position.size.abs();
    }

    let total: f64 = by_exchange.values().sum();
    if total == 0.0 {
        debug!(venues = by_exchange.len(), "no exposure, counterparty risk is empty");
        return CounterpartyRisk {
            exposures: Vec::new(),
            concentration: 0.0,
            largest_exposure: None,
        };
    }

    let mut concentration = 0.0;
    let mut largest: Option<(&str, f64)> = None;
    let mut exposures = Vec::with_capacity(by_exchange.len());

    for (exchange, exposure) in &by_exchange {
        let share = exposure / total;
        concentration += share * share;
        if largest.map_or(true, |(_, best)| share > best) {
            largest = Some((*exchange, share));
        }
        exposures.push(ExchangeShare {
            exchange: exchange.to_string(),
            percentage: share * 100.0,
        });
    }

    CounterpartyRisk {
        exposures,
        concentration,
        largest_exposure: largest.map(|(exchange, _)| exchange.to_string()),
    }
}

/// Linear price-impact estimate; no liquidity means total slippage.
pub fn estimate_slippage(size: f64, liquidity: f64, base_slippage: f64) -> f64 {
    if liquidity == 0.0 {
        debug!(size, "zero liquidity, slippage reported as 1.0");
        return 1.0;
    }
    base_slippage + (size / liquidity) * SLIPPAGE_IMPACT_FACTOR
}

/// Split `total_size` across venues in proportion to liquidity.
///
/// Single greedy pass in input order: each venue is capped by its
/// `max_position` and by what is still unallocated. Capped-off size is not
/// redistributed.
pub fn calculate_optimal_allocation(
    total_size: f64,
    exchanges: &[ExchangeCapacity],
) -> Vec<Allocation> {
    let total_liquidity: f64 = exchanges.iter().map(|e| e.liquidity).sum();
    let mut remaining = total_size;

    exchanges
        .iter()
        .map(|exchange| {
            let amount = if total_liquidity == 0.0 {
                0.0
            } else {
                let proportional = total_size * exchange.liquidity / total_liquidity;
                proportional.min(exchange.max_position).min(remaining).max(0.0)
            };
            remaining -= amount;
            Allocation {
                exchange: exchange.exchange.clone(),
                amount,
            }
        })
        .collect()
}

/// Delta breach takes precedence over the staleness check.
pub fn needs_rebalance(
    current_delta: f64,
    time_since_last_secs: Option<i64>,
    policy: &RebalancePolicy,
) -> RebalanceCheck {
    if current_delta.abs() > policy.threshold {
        return RebalanceCheck {
            needed: true,
            reason: Some(format!(
                "Delta {:.4} exceeds threshold {}",
                current_delta, policy.threshold
            )),
        };
    }

    if let Some(elapsed) = time_since_last_secs {
        if elapsed > policy.max_interval_secs {
            return RebalanceCheck {
                needed: true,
                reason: Some(format!(
                    "{}s since last rebalance exceeds max interval {}s",
                    elapsed, policy.max_interval_secs
                )),
            };
        }
    }

    RebalanceCheck {
        needed: false,
        reason: None,
    }
}

/// Funding cash flow for one interval: shorts receive a positive rate.
pub fn calculate_funding_payment(size: f64, rate: f64, side: Side) -> f64 {
    match side {
        Side::Short => size * rate,
        Side::Long => -size * rate,
    }
}

pub fn aggregate_positions(positions: &[Position]) -> PositionSummary {
    let mut total_long = 0.0;
    let mut total_short = 0.0;
    let mut entry_notional = 0.0;
    let mut total_size = 0.0;
    let mut aggregate_pnl = 0.0;

    for position in positions {
        let value = position.size * position.current_price;
        match position.side {
            Side::Long => total_long += value,
            Side::Short => total_short += value,
        }
        entry_notional += position.entry_price * position.size;
        total_size += position.size;
        aggregate_pnl += calculate_position_pnl(
            position.entry_price,
            position.current_price,
            position.size,
            position.side,
        )
        .pnl;
    }

    let weighted_entry_price = if total_size == 0.0 {
        0.0
    } else {
        entry_notional / total_size
    };

    PositionSummary {
        total_long,
        total_short,
        net_position: total_long - total_short,
        weighted_entry_price,
        aggregate_pnl,
    }
}
