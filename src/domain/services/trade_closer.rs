//! TradeCloser - Closes every open trade before a new position is opened
//!
//! Close requests are issued concurrently and joined; the call returns only once
//! every request has come back, with the outcome of each trade.

use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::{BrokerClient, BrokerResult};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

/// A close request that did not succeed
#[derive(Debug, Clone)]
pub struct CloseFailure {
    pub trade_id: String,
    pub error: TradeError,
}

/// Per-trade outcome of `close_all`
#[derive(Debug, Clone, Default)]
pub struct CloseReport {
    pub closed: Vec<String>,
    pub failed: Vec<CloseFailure>,
}

impl CloseReport {
    pub fn total(&self) -> usize {
        self.closed.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn a report with failures into an error
    pub fn into_result(self) -> Result<Self, TradeError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(TradeError::CloseIncomplete {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

pub struct TradeCloser {
    broker: Arc<dyn BrokerClient>,
}

impl TradeCloser {
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self { broker }
    }

    /// Close all open trades
    ///
    /// Listing failures are returned as errors. Individual close failures are
    /// logged and collected in the report.
    pub async fn close_all(&self) -> BrokerResult<CloseReport> {
        let trades = self.broker.list_open_trades().await?;

        if trades.is_empty() {
            info!("No trades to be closed");
            return Ok(CloseReport::default());
        }

        info!("Closing {} open trade(s)", trades.len());

        let closes = trades.into_iter().map(|trade| {
            let broker = Arc::clone(&self.broker);
            async move {
                let outcome = broker.close_trade(&trade.id).await;
                (trade.id, outcome)
            }
        });

        let mut report = CloseReport::default();
        for (trade_id, outcome) in join_all(closes).await {
            match outcome {
                Ok(()) => {
                    info!("Trade [{}] was closed", trade_id);
                    report.closed.push(trade_id);
                }
                Err(e) => {
                    error!("Failed to close trade [{}]: {}", trade_id, e);
                    report.failed.push(CloseFailure { trade_id, error: e });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::mock_broker::{BrokerCall, MockBroker};

    fn close_calls(broker: &MockBroker) -> usize {
        broker.count(|c| matches!(c, BrokerCall::CloseTrade(_)))
    }

    #[tokio::test]
    async fn test_no_open_trades_completes_immediately() {
        let broker = Arc::new(MockBroker::new());
        let closer = TradeCloser::new(broker.clone());

        let report = closer.close_all().await.unwrap();

        assert_eq!(report.total(), 0);
        assert!(report.is_complete());
        assert_eq!(close_calls(&broker), 0);
        assert_eq!(broker.calls(), vec![BrokerCall::ListOpenTrades]);
    }

    #[tokio::test]
    async fn test_one_close_request_per_trade() {
        let broker = Arc::new(MockBroker::new().with_open_trades(&["1", "2", "3"]));
        let closer = TradeCloser::new(broker.clone());

        let report = closer.close_all().await.unwrap();

        assert_eq!(close_calls(&broker), 3);
        assert_eq!(report.closed.len(), 3);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_waits_for_every_close_regardless_of_completion_order() {
        let forward = Arc::new(
            MockBroker::new()
                .with_open_trades(&["a", "b", "c"])
                .with_close_delay("a", 5)
                .with_close_delay("b", 30)
                .with_close_delay("c", 60),
        );
        let reversed = Arc::new(
            MockBroker::new()
                .with_open_trades(&["a", "b", "c"])
                .with_close_delay("a", 60)
                .with_close_delay("b", 30)
                .with_close_delay("c", 5),
        );

        let first = TradeCloser::new(forward.clone()).close_all().await.unwrap();
        let second = TradeCloser::new(reversed.clone()).close_all().await.unwrap();

        // every close finished before close_all returned
        assert_eq!(forward.completed_closes().len(), 3);
        assert_eq!(reversed.completed_closes().len(), 3);
        assert_eq!(reversed.completed_closes(), vec!["c", "b", "a"]);

        let mut a = first.closed.clone();
        let mut b = second.closed.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_close_requests_run_concurrently() {
        let broker = Arc::new(
            MockBroker::new()
                .with_open_trades(&["1", "2", "3", "4"])
                .with_close_delay("1", 200)
                .with_close_delay("2", 200)
                .with_close_delay("3", 200)
                .with_close_delay("4", 200),
        );
        let closer = TradeCloser::new(broker);

        let started = std::time::Instant::now();
        closer.close_all().await.unwrap();

        assert!(started.elapsed() < std::time::Duration::from_millis(700));
    }

    #[tokio::test]
    async fn test_individual_failures_are_reported() {
        let broker = Arc::new(
            MockBroker::new()
                .with_open_trades(&["1", "2", "3"])
                .with_failing_close("2"),
        );
        let closer = TradeCloser::new(broker.clone());

        let report = closer.close_all().await.unwrap();

        assert_eq!(close_calls(&broker), 3);
        assert_eq!(report.closed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].trade_id, "2");

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, TradeError::CloseIncomplete { failed: 1, total: 3 }));
    }
}
