use crate::domain::entities::direction::TradeDirection;
use crate::domain::value_objects::lot_size::LotSize;
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use serde::{Deserialize, Serialize};

/// A trade currently open at the broker. Only the id matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTrade {
    pub id: String,
}

/// The trade opened by a filled market order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFill {
    pub trade_id: String,
    pub price: f64,
}

/// Outcome of a successful trade invocation, returned to the caller as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub trade_id: String,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub lot_size: LotSize,
}

impl TradeResult {
    pub fn new(
        fill: &OrderFill,
        direction: TradeDirection,
        levels: ProtectiveLevels,
        lot_size: LotSize,
    ) -> Self {
        Self {
            trade_id: fill.trade_id.clone(),
            direction,
            price: fill.price,
            take_profit: levels.take_profit,
            stop_loss: levels.stop_loss,
            lot_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_result_json_shape() {
        let fill = OrderFill {
            trade_id: "6397".to_string(),
            price: 1.1,
        };
        let levels = ProtectiveLevels {
            stop_loss: 1.103,
            take_profit: 1.096,
        };
        let result = TradeResult::new(&fill, TradeDirection::Sell, levels, LotSize::new(1.83).unwrap());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tradeId": "6397",
                "type": "sell",
                "price": 1.1,
                "takeProfit": 1.096,
                "stopLoss": 1.103,
                "lotSize": 1.83
            })
        );
    }
}
