//! Rate-space conversions and yield projections.
//!
//! Rates are decimal fractions (0.10 = 10%) carried as `f64`. Zero-denominator
//! inputs fall back to documented values instead of failing; invalid
//! arguments (zero periods, zero days, NaN) fail with `InvalidArgument`.

use crate::domain::{BaseUnits, Decimal};
use crate::error::{ensure_finite, EngineError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DAYS_PER_YEAR: u32 = 365;

/// Perp funding settles every 8 hours.
pub const DEFAULT_FUNDING_INTERVALS_PER_DAY: u32 = 3;

/// Result of projecting a principal forward at a fixed APY.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsProjection {
    pub final_amount: f64,
    pub earnings: f64,
    pub daily_earnings: f64,
}

/// One contributor to a blended yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldSource {
    pub name: String,
    pub apy: f64,
    /// In [0, 1]. Weights across sources need not sum to 1.
    pub weight: f64,
}

impl YieldSource {
    pub fn new(name: impl Into<String>, apy: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            apy,
            weight,
        }
    }
}

fn periods(name: &str, n: u32) -> Result<f64> {
    if n == 0 {
        return Err(EngineError::InvalidArgument(format!("{} must be > 0", name)));
    }
    Ok(f64::from(n))
}

/// `(1 + apr/n)^n - 1`.
pub fn apr_to_apy(apr: f64, periods_per_year: u32) -> Result<f64> {
    let apr = ensure_finite("apr", apr)?;
    let n = periods("periods_per_year", periods_per_year)?;
    Ok((1.0 + apr / n).powf(n) - 1.0)
}

/// `n * ((1 + apy)^(1/n) - 1)`, the inverse of [`apr_to_apy`].
pub fn apy_to_apr(apy: f64, periods_per_year: u32) -> Result<f64> {
    let apy = ensure_finite("apy", apy)?;
    let n = periods("periods_per_year", periods_per_year)?;
    if apy <= -1.0 {
        return Err(EngineError::InvalidArgument(format!(
            "apy must be > -1, got {}",
            apy
        )));
    }
    Ok(n * ((1.0 + apy).powf(1.0 / n) - 1.0))
}

/// Annualize a per-interval funding rate: scale to a daily rate, then
/// compound daily over a year. Negative rates stay negative.
pub fn funding_rate_to_apy(rate: f64, intervals_per_day: u32) -> Result<f64> {
    let rate = ensure_finite("funding rate", rate)?;
    let daily_rate = rate * f64::from(intervals_per_day);
    apr_to_apy(daily_rate * f64::from(DAYS_PER_YEAR), DAYS_PER_YEAR)
}

/// Project `principal` forward `days` days at `apy`.
///
/// With `compounding`, the exact daily rate `(1+apy)^(1/365) - 1` is applied
/// `days` times; otherwise simple interest `apy/365 * days`.
pub fn calculate_earnings(
    principal: f64,
    apy: f64,
    days: u32,
    compounding: bool,
) -> Result<EarningsProjection> {
    let principal = ensure_finite("principal", principal)?;
    let apy = ensure_finite("apy", apy)?;
    if days == 0 {
        return Err(EngineError::InvalidArgument("days must be > 0".to_string()));
    }
    let days_f = f64::from(days);
    let year = f64::from(DAYS_PER_YEAR);

    let final_amount = if compounding {
        if apy <= -1.0 {
            return Err(EngineError::InvalidArgument(format!(
                "apy must be > -1 to compound, got {}",
                apy
            )));
        }
        let daily_rate = (1.0 + apy).powf(1.0 / year) - 1.0;
        principal * (1.0 + daily_rate).powf(days_f)
    } else {
        principal + principal * apy * days_f / year
    };

    let earnings = final_amount - principal;
    Ok(EarningsProjection {
        final_amount,
        earnings,
        daily_earnings: earnings / days_f,
    })
}

/// Assets per share. A vault with no shares issued trades at par (1.0).
pub fn calculate_exchange_rate(total_assets: f64, total_supply: f64) -> f64 {
    if total_supply == 0.0 {
        debug!(total_assets, "zero share supply, using par exchange rate");
        return 1.0;
    }
    total_assets / total_supply
}

/// APY implied by the exchange-rate move from `start_rate` to `end_rate`
/// over `days` (fractional days allowed). A zero start rate carries no
/// signal and yields 0.
pub fn calculate_rate_based_apy(start_rate: f64, end_rate: f64, days: f64) -> Result<f64> {
    let start_rate = ensure_finite("start_rate", start_rate)?;
    let end_rate = ensure_finite("end_rate", end_rate)?;
    if start_rate == 0.0 {
        debug!(end_rate, "zero start rate, rate-based apy is 0");
        return Ok(0.0);
    }
    let days = ensure_finite("days", days)?;
    if days <= 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "days must be > 0, got {}",
            days
        )));
    }

    let period_return = (end_rate - start_rate) / start_rate;
    let daily_rate = period_return / days;
    apr_to_apy(daily_rate * f64::from(DAYS_PER_YEAR), DAYS_PER_YEAR)
}

/// Weighted sum `Σ apy_i × weight_i`. Not normalized: pass weights summing
/// to 1 for a true average.
pub fn calculate_blended_yield(sources: &[YieldSource]) -> Result<f64> {
    let mut blended = 0.0;
    for source in sources {
        let apy = ensure_finite("apy", source.apy)?;
        if !(0.0..=1.0).contains(&source.weight) {
            return Err(EngineError::InvalidArgument(format!(
                "weight for {} must be within [0, 1], got {}",
                source.name, source.weight
            )));
        }
        blended += apy * source.weight;
    }
    Ok(blended)
}

/// `gross × (1 − fee_rate)`, evaluated in decimal space so round inputs give
/// round outputs (0.10 at a 10% fee is exactly 0.09).
pub fn calculate_net_yield(gross: f64, fee_rate: f64) -> f64 {
    match (Decimal::from_f64(gross), Decimal::from_f64(fee_rate)) {
        (Ok(g), Ok(f)) => {
            let one = rust_decimal::Decimal::ONE;
            match g.inner().checked_mul(one - f.inner()) {
                Some(net) => Decimal::new(net).to_f64(),
                None => gross * (1.0 - fee_rate),
            }
        }
        _ => gross * (1.0 - fee_rate),
    }
}

/// Render a rate as a percentage string: (0.1234, 2) → "12.34%".
pub fn format_percentage(rate: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}

/// Shares minted for `assets` at the current vault ratio, rounded down.
/// An empty vault mints 1:1.
pub fn convert_to_shares(
    assets: BaseUnits,
    total_assets: BaseUnits,
    total_supply: BaseUnits,
) -> Result<BaseUnits> {
    if total_supply.is_zero() || total_assets.is_zero() {
        debug!(%total_assets, %total_supply, "empty vault, converting at par");
        return Ok(assets);
    }
    assets.mul_div_floor(total_supply, total_assets)
}

/// Assets redeemable for `shares` at the current vault ratio, rounded down.
pub fn convert_to_assets(
    shares: BaseUnits,
    total_assets: BaseUnits,
    total_supply: BaseUnits,
) -> Result<BaseUnits> {
    if total_supply.is_zero() {
        debug!(%total_assets, "zero share supply, converting at par");
        return Ok(shares);
    }
    shares.mul_div_floor(total_assets, total_supply)
}
