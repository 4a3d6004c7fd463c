//! QuoteService - Fetches the current instrument price

use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::{BrokerClient, BrokerResult};
use crate::domain::value_objects::price::Price;
use std::sync::Arc;

/// Account-currency value of one pip on a reference lot, before dividing by price
const PIP_VALUE_NUMERATOR: f64 = 10.0;

/// Fetches quotes from the broker. Nothing is cached between calls.
pub struct QuoteService {
    broker: Arc<dyn BrokerClient>,
}

impl QuoteService {
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self { broker }
    }

    /// Current bid price of the instrument
    pub async fn get_current_price(&self) -> BrokerResult<Price> {
        let bid = self.broker.get_bid_price().await?;
        let price = Price::new(bid).map_err(|e| {
            tracing::error!("Unusable bid price {} from {}: {}", bid, self.broker.name(), e);
            TradeError::InvalidQuote(format!("bid {}: {}", bid, e))
        })?;

        tracing::debug!("Current bid price: {}", price.value());
        Ok(price)
    }

    /// Value of one pip movement, derived from the current bid
    pub async fn get_value_per_pip(&self) -> BrokerResult<f64> {
        let price = self.get_current_price().await?;
        Ok(PIP_VALUE_NUMERATOR / price.value())
    }
}
