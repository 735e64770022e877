//! Value types shared by the calculators.
//!
//! - `Decimal`: lossless human-readable amounts
//! - `BaseUnits`: on-chain integer amounts plus unit conversion
//! - `Side` / `Position`: exposure snapshots for the delta-neutral analyzer

pub mod amount;
pub mod decimal;
pub mod primitives;

pub use amount::{format_units, parse_units, BaseUnits, MAX_DECIMALS};
pub use decimal::Decimal;
pub use primitives::{now_secs, Position, Side};
