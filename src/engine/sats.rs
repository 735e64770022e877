//! Sats points program: accrual, tiers, ranking and season payouts.
//!
//! The tier and base-rate tables are fixed protocol constants. Balances are
//! snapshots owned by the points backend; everything here derives from them.

use crate::domain::primitives::resolve_now;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Activities that accrue sats. Declaration order is the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Holding,
    Staking,
    Liquidity,
    Referral,
    EarlyAdopter,
    Integration,
    Governance,
    SpecialEvent,
}

/// Sats per $1000 of activity per day.
pub const ACTIVITY_BASE_RATES: [(ActivityType, f64); 8] = [
    (ActivityType::Holding, 10.0),
    (ActivityType::Staking, 20.0),
    (ActivityType::Liquidity, 30.0),
    (ActivityType::Referral, 5.0),
    (ActivityType::EarlyAdopter, 15.0),
    (ActivityType::Integration, 25.0),
    (ActivityType::Governance, 10.0),
    (ActivityType::SpecialEvent, 50.0),
];

impl ActivityType {
    pub fn base_rate(&self) -> f64 {
        ACTIVITY_BASE_RATES
            .iter()
            .find(|(activity, _)| activity == self)
            .map(|(_, rate)| *rate)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Base,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThreshold {
    pub tier: Tier,
    pub min_sats: f64,
    pub multiplier: f64,
}

/// Highest tier first; lookup takes the first row the balance reaches.
pub const TIER_TABLE: [TierThreshold; 6] = [
    TierThreshold {
        tier: Tier::Diamond,
        min_sats: 1_000_000.0,
        multiplier: 3.0,
    },
    TierThreshold {
        tier: Tier::Platinum,
        min_sats: 500_000.0,
        multiplier: 2.0,
    },
    TierThreshold {
        tier: Tier::Gold,
        min_sats: 100_000.0,
        multiplier: 1.5,
    },
    TierThreshold {
        tier: Tier::Silver,
        min_sats: 25_000.0,
        multiplier: 1.25,
    },
    TierThreshold {
        tier: Tier::Bronze,
        min_sats: 5_000.0,
        multiplier: 1.1,
    },
    TierThreshold {
        tier: Tier::Base,
        min_sats: 0.0,
        multiplier: 1.0,
    },
];

impl Tier {
    fn row(&self) -> &'static TierThreshold {
        // Every tier has exactly one row.
        let idx = TIER_TABLE.len() - 1 - *self as usize;
        &TIER_TABLE[idx]
    }

    pub fn min_sats(&self) -> f64 {
        self.row().min_sats
    }

    pub fn multiplier(&self) -> f64 {
        self.row().multiplier
    }

    /// One rank up; `None` at the top.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Base => Some(Tier::Bronze),
            Tier::Bronze => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => Some(Tier::Diamond),
            Tier::Diamond => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_type: ActivityType,
    /// USD value engaged in the activity.
    pub amount: f64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Activity {
    pub fn new(activity_type: ActivityType, amount: f64) -> Self {
        Self {
            activity_type,
            amount,
            multiplier: default_multiplier(),
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier: Tier,
    pub multiplier: f64,
    pub next_tier: Option<Tier>,
    pub sats_to_next_tier: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankChange {
    /// Positive when the rank improved (moved to a lower number).
    pub change: i64,
    pub direction: RankDirection,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub is_ended: bool,
    pub formatted: String,
}

/// Snapshot of a user's sats as reported by the points backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatsBalance {
    pub total: f64,
    pub breakdown: BTreeMap<ActivityType, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityShare {
    pub activity: ActivityType,
    pub percentage: f64,
}

impl SatsBalance {
    pub fn tier(&self) -> TierInfo {
        get_multiplier_tier(self.total)
    }

    /// Percentage of the breakdown earned by each activity.
    pub fn activity_shares(&self) -> Vec<ActivityShare> {
        let sum: f64 = self.breakdown.values().sum();
        if sum == 0.0 {
            return Vec::new();
        }
        self.breakdown
            .iter()
            .map(|(activity, sats)| ActivityShare {
                activity: *activity,
                percentage: sats / sum * 100.0,
            })
            .collect()
    }
}

/// Σ (amount / 1000) × base_rate × multiplier.
pub fn calculate_daily_earnings(activities: &[Activity]) -> f64 {
    activities
        .iter()
        .map(|a| (a.amount / 1000.0) * a.activity_type.base_rate() * a.multiplier)
        .sum()
}

pub fn get_multiplier_tier(total_sats: f64) -> TierInfo {
    let row = TIER_TABLE
        .iter()
        .find(|row| total_sats >= row.min_sats)
        .unwrap_or(&TIER_TABLE[TIER_TABLE.len() - 1]);

    let next_tier = row.tier.next();
    TierInfo {
        tier: row.tier,
        multiplier: row.multiplier,
        next_tier,
        sats_to_next_tier: next_tier.map(|next| next.min_sats() - total_sats),
    }
}

/// Share of `population` strictly below `value`, as a percentage.
///
/// Ties do not count, so the top of a tied group is not credited with them.
pub fn calculate_percentile(value: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let below = population.iter().filter(|&&v| v < value).count();
    below as f64 * 100.0 / population.len() as f64
}

/// Balance after `days` of accrual at `daily_rate`.
///
/// With `compounding`, each day's accrual is scaled by the tier multiplier of
/// the running balance. The multiplier is a step function, so this walks day
/// by day: O(days).
pub fn project_sats_earnings(current: f64, daily_rate: f64, days: u32, compounding: bool) -> f64 {
    if !compounding {
        return current + daily_rate * f64::from(days);
    }

    let mut balance = current;
    let mut tier = get_multiplier_tier(balance).tier;
    for day in 0..days {
        let info = get_multiplier_tier(balance);
        if info.tier != tier {
            trace!(day, from = ?tier, to = ?info.tier, balance, "sats projection changed tier");
            tier = info.tier;
        }
        balance += daily_rate * info.multiplier;
    }
    balance
}

/// Pro-rata share of the season reward pool; 0 when no sats were issued.
pub fn estimate_ena_rewards(user_sats: f64, total_season_sats: f64, reward_pool: f64) -> f64 {
    if total_season_sats == 0.0 {
        return 0.0;
    }
    user_sats / total_season_sats * reward_pool
}

/// Lower rank is better. The difference is taken in `i64`, which holds every
/// pair of `u32` ranks.
pub fn calculate_rank_change(previous_rank: u32, current_rank: u32) -> RankChange {
    let change = i64::from(previous_rank) - i64::from(current_rank);
    let (direction, formatted) = match change {
        c if c > 0 => (RankDirection::Up, format!("↑{}", c)),
        c if c < 0 => (RankDirection::Down, format!("↓{}", c.unsigned_abs())),
        _ => (RankDirection::Stable, "-".to_string()),
    };
    RankChange {
        change,
        direction,
        formatted,
    }
}

pub fn get_season_time_remaining(end_date: i64, now: Option<i64>) -> SeasonTimeRemaining {
    let remaining = end_date - resolve_now(now);
    if remaining <= 0 {
        return SeasonTimeRemaining {
            days: 0,
            hours: 0,
            minutes: 0,
            is_ended: true,
            formatted: "Season Ended".to_string(),
        };
    }

    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;
    SeasonTimeRemaining {
        days,
        hours,
        minutes,
        is_ended: false,
        formatted: format!("{}d {}h {}m", days, hours, minutes),
    }
}

/// "1.50M", "2.50K", or a whole number below a thousand.
///
/// Whole numbers round half away from zero (0.5 → "1").
pub fn format_sats(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.0}", value.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table_monotonic() {
        for pair in TIER_TABLE.windows(2) {
            assert!(pair[0].min_sats > pair[1].min_sats);
            assert!(pair[0].multiplier > pair[1].multiplier);
            assert!(pair[0].tier > pair[1].tier);
        }
    }

    #[test]
    fn test_tier_rows_line_up() {
        for row in TIER_TABLE.iter() {
            assert_eq!(row.tier.min_sats(), row.min_sats);
            assert_eq!(row.tier.multiplier(), row.multiplier);
        }
    }

    #[test]
    fn test_base_rates() {
        assert_eq!(ActivityType::Holding.base_rate(), 10.0);
        assert_eq!(ActivityType::Liquidity.base_rate(), 30.0);
        assert_eq!(ActivityType::SpecialEvent.base_rate(), 50.0);
    }

    #[test]
    fn test_multiplier_tier_lookup() {
        assert_eq!(get_multiplier_tier(100_000.0).tier, Tier::Gold);
        assert_eq!(get_multiplier_tier(99_999.0).tier, Tier::Silver);
        assert_eq!(get_multiplier_tier(-5.0).tier, Tier::Base);

        let top = get_multiplier_tier(1_000_000.0);
        assert_eq!(top.tier, Tier::Diamond);
        assert_eq!(top.next_tier, None);
        assert_eq!(top.sats_to_next_tier, None);

        let low = get_multiplier_tier(4_000.0);
        assert_eq!(low.next_tier, Some(Tier::Bronze));
        assert_eq!(low.sats_to_next_tier, Some(1_000.0));
    }

    #[test]
    fn test_percentile_strictly_less() {
        assert_eq!(calculate_percentile(350.0, &[100.0, 200.0, 300.0, 400.0, 500.0]), 60.0);
        assert_eq!(calculate_percentile(50.0, &[100.0, 200.0, 300.0]), 0.0);
        assert_eq!(calculate_percentile(200.0, &[100.0, 200.0, 200.0, 300.0]), 25.0);
        assert_eq!(calculate_percentile(10.0, &[]), 0.0);
    }

    #[test]
    fn test_rank_change() {
        let up = calculate_rank_change(10, 7);
        assert_eq!(up.change, 3);
        assert_eq!(up.direction, RankDirection::Up);
        assert_eq!(up.formatted, "↑3");

        let down = calculate_rank_change(7, 10);
        assert_eq!(down.direction, RankDirection::Down);
        assert_eq!(down.formatted, "↓3");

        let same = calculate_rank_change(5, 5);
        assert_eq!(same.direction, RankDirection::Stable);
        assert_eq!(same.formatted, "-");
    }

    #[test]
    fn test_rank_change_at_extremes() {
        let fell = calculate_rank_change(0, u32::MAX);
        assert_eq!(fell.change, -i64::from(u32::MAX));
        assert_eq!(fell.direction, RankDirection::Down);
        assert_eq!(fell.formatted, "↓4294967295");

        let rose = calculate_rank_change(u32::MAX, 1);
        assert_eq!(rose.change, i64::from(u32::MAX) - 1);
        assert_eq!(rose.formatted, "↑4294967294");
    }

    #[test]
    fn test_format_sats() {
        assert_eq!(format_sats(1_500_000.0), "1.50M");
        assert_eq!(format_sats(2_500.0), "2.50K");
        assert_eq!(format_sats(999.0), "999");
        assert_eq!(format_sats(0.0), "0");
    }

    #[test]
    fn test_format_sats_rounds_half_up() {
        assert_eq!(format_sats(0.5), "1");
        assert_eq!(format_sats(2.5), "3");
        assert_eq!(format_sats(2.4), "2");
    }

    #[test]
    fn test_activity_shares() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(ActivityType::Staking, 750.0);
        breakdown.insert(ActivityType::Holding, 250.0);
        let balance = SatsBalance { total: 1_000.0, breakdown };

        let shares = balance.activity_shares();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].activity, ActivityType::Holding);
        assert_eq!(shares[0].percentage, 25.0);
        assert_eq!(shares[1].percentage, 75.0);
        assert_eq!(balance.tier().tier, Tier::Base);

        assert!(SatsBalance::default().activity_shares().is_empty());
    }
}
