//! TradeOrchestrator - Runs one trade signal end to end
//!
//! Stages run strictly in order:
//!
//! `ClosingExisting → Sizing → Submitting → AttachingProtection → Done`
//!
//! The first failure stops the pipeline and is returned together with the
//! stage it happened in. No stage is retried.

use crate::config::RiskParameters;
use crate::domain::entities::direction::TradeDirection;
use crate::domain::entities::order::MarketOrder;
use crate::domain::entities::trade::{OrderFill, TradeResult};
use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::BrokerClient;
use crate::domain::services::account_service::AccountService;
use crate::domain::services::position_sizer::PositionSizer;
use crate::domain::services::protective_levels::ProtectiveLevelCalculator;
use crate::domain::services::quote_service::QuoteService;
use crate::domain::services::trade_closer::TradeCloser;
use crate::domain::value_objects::lot_size::LotSize;
use crate::domain::value_objects::price::Price;
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStage {
    ClosingExisting,
    Sizing,
    Submitting,
    AttachingProtection,
    Done,
}

impl std::fmt::Display for TradeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeStage::ClosingExisting => write!(f, "closing_existing"),
            TradeStage::Sizing => write!(f, "sizing"),
            TradeStage::Submitting => write!(f, "submitting"),
            TradeStage::AttachingProtection => write!(f, "attaching_protection"),
            TradeStage::Done => write!(f, "done"),
        }
    }
}

/// A failed orchestration, tagged with the stage that failed
#[derive(Debug, Clone, Error)]
#[error("Trade failed while {stage}: {source}")]
pub struct OrchestrationError {
    pub stage: TradeStage,
    pub source: TradeError,
}

impl OrchestrationError {
    fn at(stage: TradeStage) -> impl FnOnce(TradeError) -> OrchestrationError {
        move |source| {
            error!("[{}] {} ({})", stage, source, source.code());
            OrchestrationError { stage, source }
        }
    }
}

pub struct TradeOrchestrator {
    broker: Arc<dyn BrokerClient>,
    closer: TradeCloser,
    sizer: PositionSizer,
    levels: ProtectiveLevelCalculator,
}

impl TradeOrchestrator {
    pub fn new(broker: Arc<dyn BrokerClient>, risk: RiskParameters) -> Self {
        let sizer = PositionSizer::new(
            AccountService::new(Arc::clone(&broker)),
            QuoteService::new(Arc::clone(&broker)),
            risk,
        );

        Self {
            closer: TradeCloser::new(Arc::clone(&broker)),
            sizer,
            levels: ProtectiveLevelCalculator::new(&risk),
            broker,
        }
    }

    /// Replace any open exposure with a new protected position in `direction`
    pub async fn make_trade(
        &self,
        direction: TradeDirection,
    ) -> Result<TradeResult, OrchestrationError> {
        info!("Trade signal received: {} on {}", direction, self.broker.name());

        let mut stage = TradeStage::ClosingExisting;
        self.close_existing()
            .await
            .map_err(OrchestrationError::at(stage))?;

        stage = TradeStage::Sizing;
        let lot_size = self
            .sizer
            .get_lot_size()
            .await
            .map_err(OrchestrationError::at(stage))?;

        stage = TradeStage::Submitting;
        let fill = self
            .submit(direction, lot_size)
            .await
            .map_err(OrchestrationError::at(stage))?;

        stage = TradeStage::AttachingProtection;
        let levels = self
            .attach_protection(direction, &fill)
            .await
            .map_err(OrchestrationError::at(stage))?;

        stage = TradeStage::Done;
        let result = TradeResult::new(&fill, direction, levels, lot_size);
        info!(
            "[{}] Trade {} {} {} lots @ {} (SL {}, TP {})",
            stage,
            result.trade_id,
            direction,
            lot_size.value(),
            result.price,
            result.stop_loss,
            result.take_profit
        );

        Ok(result)
    }

    async fn close_existing(&self) -> Result<(), TradeError> {
        let report = self.closer.close_all().await?.into_result()?;
        info!("[{}] {} trade(s) closed", TradeStage::ClosingExisting, report.total());
        Ok(())
    }

    async fn submit(
        &self,
        direction: TradeDirection,
        lot_size: LotSize,
    ) -> Result<OrderFill, TradeError> {
        let order = MarketOrder::new(direction, lot_size).map_err(TradeError::Sizing)?;
        info!(
            "[{}] Market order {} units of {}",
            TradeStage::Submitting,
            order.units,
            order.instrument
        );

        let fill = self.broker.submit_market_order(&order).await?;
        info!(
            "[{}] Filled: trade {} @ {}",
            TradeStage::Submitting,
            fill.trade_id,
            fill.price
        );
        Ok(fill)
    }

    /// Compute the levels once, attach them, and hand the same value back
    async fn attach_protection(
        &self,
        direction: TradeDirection,
        fill: &OrderFill,
    ) -> Result<ProtectiveLevels, TradeError> {
        let entry = Price::new(fill.price).map_err(|e| {
            TradeError::MalformedResponse(format!("fill price {}: {}", fill.price, e))
        })?;
        let levels = self.levels.compute_levels(direction, entry);

        self.broker.attach_protection(&fill.trade_id, &levels).await?;
        info!(
            "[{}] Trade {} protected: SL {} TP {}",
            TradeStage::AttachingProtection,
            fill.trade_id,
            levels.stop_loss,
            levels.take_profit
        );
        Ok(levels)
    }
}
