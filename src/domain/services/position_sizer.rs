//! Position sizing service that turns account risk into a lot size
//!
//! The lot size is chosen so that hitting the stop-loss loses roughly
//! `risk_fraction` of the current balance:
//!
//! `lot = balance × risk_fraction / (value_per_pip × stop_loss_pips)`
//!
//! rounded to 2 decimals.

use crate::config::RiskParameters;
use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::BrokerResult;
use crate::domain::services::account_service::AccountService;
use crate::domain::services::quote_service::QuoteService;
use crate::domain::value_objects::lot_size::LotSize;

/// PositionSizer service for calculating risk-bounded lot sizes
pub struct PositionSizer {
    accounts: AccountService,
    quotes: QuoteService,
    risk: RiskParameters,
}

impl PositionSizer {
    pub fn new(accounts: AccountService, quotes: QuoteService, risk: RiskParameters) -> Self {
        Self {
            accounts,
            quotes,
            risk,
        }
    }

    /// Lot size for a new position, from fresh balance and price
    ///
    /// Must only be called once every previous trade is closed, so the balance
    /// reflects realised P&L.
    pub async fn get_lot_size(&self) -> BrokerResult<LotSize> {
        let balance = self.accounts.get_current_balance().await?;
        let value_per_pip = self.quotes.get_value_per_pip().await?;

        let lot_size = Self::calculate(balance, value_per_pip, &self.risk)?;
        tracing::info!(
            "Lot size {:.2} (balance={:.2}, value_per_pip={:.5}, risk={}, stop_loss_pips={})",
            lot_size.value(),
            balance,
            value_per_pip,
            self.risk.risk_fraction,
            self.risk.stop_loss_pips
        );

        Ok(lot_size)
    }

    /// Pure sizing formula
    pub fn calculate(
        balance: f64,
        value_per_pip: f64,
        risk: &RiskParameters,
    ) -> Result<LotSize, TradeError> {
        if !(risk.stop_loss_pips.is_finite() && risk.stop_loss_pips > 0.0) {
            return Err(TradeError::Sizing(format!(
                "stop_loss_pips must be positive, got {}",
                risk.stop_loss_pips
            )));
        }
        if !(value_per_pip.is_finite() && value_per_pip > 0.0) {
            return Err(TradeError::Sizing(format!(
                "value_per_pip must be positive, got {}",
                value_per_pip
            )));
        }

        let raw = balance * risk.risk_fraction / (value_per_pip * risk.stop_loss_pips);
        LotSize::new(raw).map_err(TradeError::Sizing)
    }
}
