//! Lot size value object
//!
//! A lot size is the unsigned magnitude of a position. The sign only appears when
//! it is turned into broker units for a given direction.

use super::round_decimals;
use crate::domain::entities::direction::TradeDirection;
use serde::{Deserialize, Serialize};

/// Units in one standard lot
pub const UNITS_PER_LOT: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotSize(f64);

impl LotSize {
    /// Build a lot size from a raw value, rounding to 2 decimals
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err("Lot size must be finite".to_string());
        }
        if value < 0.0 {
            return Err("Lot size must be non-negative".to_string());
        }
        Ok(LotSize(round_decimals(value, 2)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Signed integer units for a market order: positive buys, negative sells
    pub fn to_units(&self, direction: TradeDirection) -> i64 {
        (self.0 * UNITS_PER_LOT).round() as i64 * direction.sign()
    }
}
