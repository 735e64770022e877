use crate::domain::amount::MAX_DECIMALS;
use crate::engine::cooldown::DEFAULT_COOLDOWN_SECS;
use crate::engine::delta_neutral::{
    RebalancePolicy, DEFAULT_BASE_SLIPPAGE, DEFAULT_DELTA_TOLERANCE,
    DEFAULT_FUNDING_INTERVALS_PER_YEAR, DEFAULT_MAINTENANCE_MARGIN,
    DEFAULT_REBALANCE_MAX_INTERVAL_SECS, DEFAULT_REBALANCE_THRESHOLD,
};
use crate::engine::yield_converter::DEFAULT_FUNDING_INTERVALS_PER_DAY;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Protocol parameters the calculators take as explicit arguments.
///
/// `Default` mirrors the protocol constants; the environment can override them.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub cooldown_duration_secs: i64,
    pub funding_intervals_per_day: u32,
    pub funding_intervals_per_year: u32,
    pub delta_tolerance: f64,
    pub rebalance_threshold: f64,
    pub rebalance_max_interval_secs: i64,
    pub maintenance_margin: f64,
    pub base_slippage: f64,
    pub token_decimals: u8,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_duration_secs: DEFAULT_COOLDOWN_SECS,
            funding_intervals_per_day: DEFAULT_FUNDING_INTERVALS_PER_DAY,
            funding_intervals_per_year: DEFAULT_FUNDING_INTERVALS_PER_YEAR,
            delta_tolerance: DEFAULT_DELTA_TOLERANCE,
            rebalance_threshold: DEFAULT_REBALANCE_THRESHOLD,
            rebalance_max_interval_secs: DEFAULT_REBALANCE_MAX_INTERVAL_SECS,
            maintenance_margin: DEFAULT_MAINTENANCE_MARGIN,
            base_slippage: DEFAULT_BASE_SLIPPAGE,
            token_decimals: 18,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cooldown_duration_secs = parse_or(
            &env_map,
            "ETHENA_COOLDOWN_SECONDS",
            defaults.cooldown_duration_secs,
        )?;
        require(cooldown_duration_secs > 0, "ETHENA_COOLDOWN_SECONDS", "must be > 0")?;

        let funding_intervals_per_day = parse_or(
            &env_map,
            "ETHENA_FUNDING_INTERVALS_PER_DAY",
            defaults.funding_intervals_per_day,
        )?;
        require(
            funding_intervals_per_day > 0,
            "ETHENA_FUNDING_INTERVALS_PER_DAY",
            "must be > 0",
        )?;

        let funding_intervals_per_year = parse_or(
            &env_map,
            "ETHENA_FUNDING_INTERVALS_PER_YEAR",
            defaults.funding_intervals_per_year,
        )?;
        require(
            funding_intervals_per_year > 0,
            "ETHENA_FUNDING_INTERVALS_PER_YEAR",
            "must be > 0",
        )?;

        let delta_tolerance =
            parse_or(&env_map, "ETHENA_DELTA_TOLERANCE", defaults.delta_tolerance)?;
        require_non_negative(delta_tolerance, "ETHENA_DELTA_TOLERANCE")?;

        let rebalance_threshold = parse_or(
            &env_map,
            "ETHENA_REBALANCE_THRESHOLD",
            defaults.rebalance_threshold,
        )?;
        require_non_negative(rebalance_threshold, "ETHENA_REBALANCE_THRESHOLD")?;

        let rebalance_max_interval_secs = parse_or(
            &env_map,
            "ETHENA_REBALANCE_MAX_INTERVAL_SECS",
            defaults.rebalance_max_interval_secs,
        )?;
        require(
            rebalance_max_interval_secs > 0,
            "ETHENA_REBALANCE_MAX_INTERVAL_SECS",
            "must be > 0",
        )?;

        let maintenance_margin = parse_or(
            &env_map,
            "ETHENA_MAINTENANCE_MARGIN",
            defaults.maintenance_margin,
        )?;
        require(
            maintenance_margin.is_finite() && (0.0..1.0).contains(&maintenance_margin),
            "ETHENA_MAINTENANCE_MARGIN",
            "must be in [0, 1)",
        )?;

        let base_slippage = parse_or(&env_map, "ETHENA_BASE_SLIPPAGE", defaults.base_slippage)?;
        require_non_negative(base_slippage, "ETHENA_BASE_SLIPPAGE")?;

        let token_decimals = parse_or(&env_map, "ETHENA_TOKEN_DECIMALS", defaults.token_decimals)?;
        require(
            token_decimals <= MAX_DECIMALS,
            "ETHENA_TOKEN_DECIMALS",
            "must be between 0 and 36",
        )?;

        Ok(EngineConfig {
            cooldown_duration_secs,
            funding_intervals_per_day,
            funding_intervals_per_year,
            delta_tolerance,
            rebalance_threshold,
            rebalance_max_interval_secs,
            maintenance_margin,
            base_slippage,
            token_decimals,
        })
    }

    /// Rebalance trigger built from the configured threshold and interval.
    pub fn rebalance_policy(&self) -> RebalancePolicy {
        RebalancePolicy {
            threshold: self.rebalance_threshold,
            max_interval_secs: self.rebalance_max_interval_secs,
        }
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key).map(|s| s.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), format!("could not parse {:?}", raw))
        }),
    }
}

fn require(condition: bool, key: &str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(key.to_string(), reason.to_string()))
    }
}

fn require_non_negative(value: f64, key: &str) -> Result<(), ConfigError> {
    require(value.is_finite() && value >= 0.0, key, "must be a finite number >= 0")
}
