//! Financial calculation engine for Ethena protocol integrations.
//!
//! Converts already-fetched on-chain and off-chain measurements into yield,
//! hedge, cooldown and points metrics. See `engine` for the calculators.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::{ConfigError, EngineConfig};
pub use domain::{format_units, parse_units, BaseUnits, Decimal, Position, Side};
pub use error::{EngineError, Result};
