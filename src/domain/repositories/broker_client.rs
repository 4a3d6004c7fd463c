//! Broker Client Trait
//!
//! This module defines the `BrokerClient` trait, the seam between the trade
//! workflow and the broker's REST API. Domain services only see this trait, so
//! they can be exercised against in-memory mocks.

use crate::domain::entities::order::MarketOrder;
use crate::domain::entities::trade::{OpenTrade, OrderFill};
use crate::domain::errors::TradeError;
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use async_trait::async_trait;

/// Common result type for broker operations
pub type BrokerResult<T> = Result<T, TradeError>;

/// Broker operations used by the trade workflow
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Name of the broker, for logs
    fn name(&self) -> &str;

    /// Current bid price of the traded instrument
    async fn get_bid_price(&self) -> BrokerResult<f64>;

    /// Current account balance in account currency
    async fn get_account_balance(&self) -> BrokerResult<f64>;

    /// All trades in the OPEN state
    async fn list_open_trades(&self) -> BrokerResult<Vec<OpenTrade>>;

    /// Close the whole of one trade
    async fn close_trade(&self, trade_id: &str) -> BrokerResult<()>;

    /// Submit a market order and return the trade it opened
    async fn submit_market_order(&self, order: &MarketOrder) -> BrokerResult<OrderFill>;

    /// Attach stop-loss and take-profit orders to an open trade
    async fn attach_protection(&self, trade_id: &str, levels: &ProtectiveLevels)
        -> BrokerResult<()>;
}
