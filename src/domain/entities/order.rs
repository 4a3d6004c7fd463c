use crate::domain::entities::direction::TradeDirection;
use crate::domain::value_objects::lot_size::LotSize;
use serde::Serialize;

/// Instrument traded by this service
pub const INSTRUMENT: &str = "EUR_USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

/// Market order in broker units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketOrder {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub instrument: String,
    pub units: i64,
}

impl MarketOrder {
    /// Build a market order for `lot_size` in the given direction
    ///
    /// Fails when the lot size rounds to zero units; the broker would reject it anyway.
    pub fn new(direction: TradeDirection, lot_size: LotSize) -> Result<Self, String> {
        let units = lot_size.to_units(direction);
        if units == 0 {
            return Err(format!(
                "Lot size {} is too small to trade (0 units)",
                lot_size.value()
            ));
        }

        Ok(MarketOrder {
            order_type: OrderType::Market,
            instrument: INSTRUMENT.to_string(),
            units,
        })
    }
}
