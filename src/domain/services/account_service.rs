//! AccountService - Fetches the account balance

use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::{BrokerClient, BrokerResult};
use std::sync::Arc;

/// Reads the account balance straight from the broker on every call
pub struct AccountService {
    broker: Arc<dyn BrokerClient>,
}

impl AccountService {
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self { broker }
    }

    pub async fn get_current_balance(&self) -> BrokerResult<f64> {
        let balance = self.broker.get_account_balance().await?;

        if !balance.is_finite() || balance < 0.0 {
            tracing::error!("Unusable balance {} from {}", balance, self.broker.name());
            return Err(TradeError::InvalidBalance(format!(
                "balance must be a non-negative number, got {}",
                balance
            )));
        }

        tracing::info!("Account balance: {:.2}", balance);
        Ok(balance)
    }
}
