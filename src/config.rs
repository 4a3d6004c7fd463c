use crate::domain::errors::TradeError;
use std::net::SocketAddr;
use std::time::Duration;

/// Risk settings applied to every trade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParameters {
    pub risk_fraction: f64,    // Fraction of balance risked per trade, in (0, 1]
    pub stop_loss_pips: f64,   // Stop-loss distance from entry
    pub take_profit_pips: f64, // Take-profit distance from entry
}

impl RiskParameters {
    pub fn new(
        risk_fraction: f64,
        stop_loss_pips: f64,
        take_profit_pips: f64,
    ) -> Result<Self, TradeError> {
        if !(risk_fraction > 0.0 && risk_fraction <= 1.0) {
            return Err(TradeError::InvalidConfiguration(format!(
                "risk_fraction must be in range (0, 1], got {}",
                risk_fraction
            )));
        }
        if !(stop_loss_pips.is_finite() && stop_loss_pips > 0.0) {
            return Err(TradeError::InvalidConfiguration(format!(
                "stop_loss_pips must be positive, got {}",
                stop_loss_pips
            )));
        }
        if !(take_profit_pips.is_finite() && take_profit_pips > 0.0) {
            return Err(TradeError::InvalidConfiguration(format!(
                "take_profit_pips must be positive, got {}",
                take_profit_pips
            )));
        }

        Ok(Self {
            risk_fraction,
            stop_loss_pips,
            take_profit_pips,
        })
    }
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            risk_fraction: 0.05,
            stop_loss_pips: 30.0,
            take_profit_pips: 40.0,
        }
    }
}

/// Process configuration for the trade server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub risk: RiskParameters,
    pub broker_timeout: Duration,
    pub max_request_body_bytes: usize,
}

impl ServerConfig {
    pub fn default() -> ServerConfig {
        ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            risk: RiskParameters::default(),
            broker_timeout: Duration::from_secs(10),
            max_request_body_bytes: 16 * 1024,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Invalid values are logged and the default is kept.
    pub fn from_env() -> ServerConfig {
        let mut config = ServerConfig::default();
        let mut risk = config.risk;

        if let Ok(addr) = std::env::var("SERVER_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(value) => config.addr = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse SERVER_ADDR '{}': {}, using default: {}",
                        addr,
                        e,
                        config.addr
                    );
                }
            }
        }

        if let Ok(fraction) = std::env::var("RISK_FRACTION") {
            match fraction.parse::<f64>() {
                Ok(value) if value > 0.0 && value <= 1.0 => {
                    risk.risk_fraction = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid RISK_FRACTION value: {} (must be in (0, 1]), using default: {}",
                        value,
                        risk.risk_fraction
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse RISK_FRACTION '{}': {}, using default: {}",
                        fraction,
                        e,
                        risk.risk_fraction
                    );
                }
            }
        }

        if let Ok(sl) = std::env::var("STOP_LOSS_PIPS") {
            match sl.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => risk.stop_loss_pips = value,
                _ => tracing::warn!(
                    "Invalid STOP_LOSS_PIPS '{}', using default: {}",
                    sl,
                    risk.stop_loss_pips
                ),
            }
        }

        if let Ok(tp) = std::env::var("TAKE_PROFIT_PIPS") {
            match tp.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => risk.take_profit_pips = value,
                _ => tracing::warn!(
                    "Invalid TAKE_PROFIT_PIPS '{}', using default: {}",
                    tp,
                    risk.take_profit_pips
                ),
            }
        }

        if let Ok(timeout) = std::env::var("BROKER_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(value) if (1..=300).contains(&value) => {
                    config.broker_timeout = Duration::from_secs(value);
                }
                _ => tracing::warn!(
                    "Invalid BROKER_TIMEOUT_SECS '{}' (must be 1-300), using default: {:?}",
                    timeout,
                    config.broker_timeout
                ),
            }
        }

        if let Ok(limit) = std::env::var("MAX_REQUEST_BODY_BYTES") {
            match limit.parse::<usize>() {
                Ok(value) if value >= 256 => config.max_request_body_bytes = value,
                _ => tracing::warn!(
                    "Invalid MAX_REQUEST_BODY_BYTES '{}', using default: {}",
                    limit,
                    config.max_request_body_bytes
                ),
            }
        }

        config.risk = risk;
        config
    }
}
