use serde::{Deserialize, Serialize};

/// Absolute stop-loss and take-profit prices for one position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectiveLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl ProtectiveLevels {
    /// Prices formatted the way the broker expects them in an order body
    pub fn as_price_strings(&self) -> (String, String) {
        (self.stop_loss.to_string(), self.take_profit.to_string())
    }
}
