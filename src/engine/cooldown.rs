//! Status derivation for the time-locked unstaking window.
//!
//! The lifecycle (initiate, wait, withdraw) is driven elsewhere; this module
//! only classifies a `CooldownWindow` snapshot at a point in time.

use crate::domain::primitives::resolve_now;
use crate::domain::BaseUnits;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Protocol unstaking lock: 7 days.
pub const DEFAULT_COOLDOWN_SECS: i64 = 604_800;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;

/// On-chain cooldown record for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownWindow {
    pub start_time: i64,
    pub end_time: i64,
    pub locked_amount: BaseUnits,
}

impl CooldownWindow {
    /// Window opened at `start_time` for the given lock duration.
    pub fn starting_at(start_time: i64, duration_secs: i64, locked_amount: BaseUnits) -> Self {
        Self {
            start_time,
            end_time: cooldown_end_time(start_time, duration_secs),
            locked_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownPhase {
    /// Nothing locked.
    Inactive,
    /// Locked, end time not reached.
    Locked,
    /// Locked and past the end time.
    Withdrawable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownStatus {
    pub is_active: bool,
    pub can_withdraw: bool,
    pub remaining_seconds: i64,
    /// Elapsed share of the window, 0..=100.
    pub progress: f64,
    pub phase: CooldownPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_iso: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownValidation {
    pub valid: bool,
    pub reason: Option<String>,
    /// Largest amount that could be put into cooldown right now.
    pub max_amount: BaseUnits,
}

pub fn cooldown_end_time(start_time: i64, duration_secs: i64) -> i64 {
    start_time.saturating_add(duration_secs)
}

pub fn calculate_cooldown_status(window: &CooldownWindow, now: Option<i64>) -> CooldownStatus {
    let now = resolve_now(now);
    let is_active = window.start_time > 0 && !window.locked_amount.is_zero();
    let can_withdraw = is_active && now >= window.end_time;
    let remaining_seconds = window.end_time.saturating_sub(now).max(0);

    let duration = window.end_time.saturating_sub(window.start_time);
    let progress = if duration == 0 {
        0.0
    } else {
        let elapsed = now.saturating_sub(window.start_time) as f64;
        (elapsed / duration as f64 * 100.0).clamp(0.0, 100.0)
    };

    let phase = match (is_active, can_withdraw) {
        (false, _) => CooldownPhase::Inactive,
        (true, false) => CooldownPhase::Locked,
        (true, true) => CooldownPhase::Withdrawable,
    };

    let end_time_iso = if is_active {
        DateTime::<Utc>::from_timestamp(window.end_time, 0)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
    } else {
        None
    };

    CooldownStatus {
        is_active,
        can_withdraw,
        remaining_seconds,
        progress,
        phase,
        end_time_iso,
    }
}

/// Compact duration such as "2d 3h 15m" or "1h 1m 5s".
///
/// Zero components are omitted and seconds are dropped once the duration
/// reaches a full day. Non-positive input renders as "Ready".
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "Ready".to_string();
    }

    let days = seconds / SECS_PER_DAY;
    let hours = (seconds % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let secs = seconds % SECS_PER_MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 && days == 0 {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

pub fn is_cooldown_complete(end_time: i64, now: Option<i64>) -> bool {
    resolve_now(now) >= end_time
}

/// Check a cooldown request against the unlocked balance, all in base units.
pub fn validate_cooldown_amount(
    requested: BaseUnits,
    available: BaseUnits,
    existing_locked: BaseUnits,
) -> CooldownValidation {
    let max_amount = available.saturating_sub(existing_locked);

    if requested.is_zero() {
        return CooldownValidation {
            valid: false,
            reason: Some("Cooldown amount must be >0".to_string()),
            max_amount,
        };
    }

    if requested > max_amount {
        return CooldownValidation {
            valid: false,
            reason: Some(format!(
                "Insufficient balance: requested {}, available {}",
                requested, max_amount
            )),
            max_amount,
        };
    }

    CooldownValidation {
        valid: true,
        reason: None,
        max_amount,
    }
}

/// One-line human summary of a status.
pub fn describe_cooldown(status: &CooldownStatus) -> String {
    match status.phase {
        CooldownPhase::Inactive => "No active cooldown".to_string(),
        CooldownPhase::Withdrawable => "Ready to withdraw".to_string(),
        CooldownPhase::Locked => format!(
            "Cooling down: {} remaining",
            format_duration(status.remaining_seconds)
        ),
    }
}
