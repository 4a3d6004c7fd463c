//! In-memory broker used by the service tests

use crate::domain::entities::order::MarketOrder;
use crate::domain::entities::trade::{OpenTrade, OrderFill};
use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::{BrokerClient, BrokerResult};
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    GetBidPrice,
    GetAccountBalance,
    ListOpenTrades,
    CloseTrade(String),
    SubmitMarketOrder(MarketOrder),
    AttachProtection(String, ProtectiveLevels),
}

pub struct MockBroker {
    pub bid: BrokerResult<f64>,
    pub balance: BrokerResult<f64>,
    pub open_trades: Vec<String>,
    pub failing_closes: HashSet<String>,
    pub close_delays_ms: HashMap<String, u64>,
    pub fill: BrokerResult<OrderFill>,
    pub attach_error: Option<TradeError>,
    calls: Mutex<Vec<BrokerCall>>,
    completed_closes: Mutex<Vec<String>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            bid: Ok(1.1),
            balance: Ok(10000.0),
            open_trades: Vec::new(),
            failing_closes: HashSet::new(),
            close_delays_ms: HashMap::new(),
            fill: Ok(OrderFill {
                trade_id: "6397".to_string(),
                price: 1.1,
            }),
            attach_error: None,
            calls: Mutex::new(Vec::new()),
            completed_closes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_open_trades(mut self, ids: &[&str]) -> Self {
        self.open_trades = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_failing_close(mut self, id: &str) -> Self {
        self.failing_closes.insert(id.to_string());
        self
    }

    pub fn with_close_delay(mut self, id: &str, millis: u64) -> Self {
        self.close_delays_ms.insert(id.to_string(), millis);
        self
    }

    pub fn with_bid(mut self, bid: BrokerResult<f64>) -> Self {
        self.bid = bid;
        self
    }

    pub fn with_balance(mut self, balance: BrokerResult<f64>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_fill(mut self, fill: BrokerResult<OrderFill>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_attach_error(mut self, error: TradeError) -> Self {
        self.attach_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Trade ids in the order their close requests finished
    pub fn completed_closes(&self) -> Vec<String> {
        self.completed_closes.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&BrokerCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: BrokerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    fn name(&self) -> &str {
        "MockBroker"
    }

    async fn get_bid_price(&self) -> BrokerResult<f64> {
        self.record(BrokerCall::GetBidPrice);
        self.bid.clone()
    }

    async fn get_account_balance(&self) -> BrokerResult<f64> {
        self.record(BrokerCall::GetAccountBalance);
        self.balance.clone()
    }

    async fn list_open_trades(&self) -> BrokerResult<Vec<OpenTrade>> {
        self.record(BrokerCall::ListOpenTrades);
        Ok(self
            .open_trades
            .iter()
            .map(|id| OpenTrade { id: id.clone() })
            .collect())
    }

    async fn close_trade(&self, trade_id: &str) -> BrokerResult<()> {
        self.record(BrokerCall::CloseTrade(trade_id.to_string()));

        if let Some(delay) = self.close_delays_ms.get(trade_id) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }

        self.completed_closes
            .lock()
            .unwrap()
            .push(trade_id.to_string());

        if self.failing_closes.contains(trade_id) {
            return Err(TradeError::HttpStatus {
                status: 404,
                body: format!("{{\"errorMessage\":\"Trade {} not found\"}}", trade_id),
            });
        }
        Ok(())
    }

    async fn submit_market_order(&self, order: &MarketOrder) -> BrokerResult<OrderFill> {
        self.record(BrokerCall::SubmitMarketOrder(order.clone()));
        self.fill.clone()
    }

    async fn attach_protection(
        &self,
        trade_id: &str,
        levels: &ProtectiveLevels,
    ) -> BrokerResult<()> {
        self.record(BrokerCall::AttachProtection(trade_id.to_string(), *levels));
        match &self.attach_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
