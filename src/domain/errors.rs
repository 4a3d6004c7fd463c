//! Error types for the trade workflow
//!
//! Every failure is terminal for the current invocation. Nothing here is retried;
//! the variants only exist so callers can tell a broker problem from a sizing or
//! configuration problem.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TradeError {
    /// Connection, DNS or TLS failure talking to the broker
    #[error("Transport error: {0}")]
    Transport(String),

    /// The broker did not answer within the configured timeout
    #[error("Broker request timed out")]
    Timeout,

    /// Anything other than 200/201
    #[error("Broker returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Body was not JSON, or a required field was missing
    #[error("Malformed broker response: {0}")]
    MalformedResponse(String),

    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    #[error("Invalid balance: {0}")]
    InvalidBalance(String),

    #[error("Position sizing failed: {0}")]
    Sizing(String),

    #[error("Failed to close {failed} of {total} open trades")]
    CloseIncomplete { failed: usize, total: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl TradeError {
    /// True when the failure came from talking to the broker rather than from our own arithmetic
    pub fn is_gateway_failure(&self) -> bool {
        match self {
            TradeError::Transport(_)
            | TradeError::Timeout
            | TradeError::HttpStatus { .. }
            | TradeError::MalformedResponse(_)
            | TradeError::InvalidQuote(_)
            | TradeError::InvalidBalance(_)
            | TradeError::CloseIncomplete { .. } => true,
            TradeError::Sizing(_) | TradeError::InvalidConfiguration(_) => false,
        }
    }

    /// Short error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            TradeError::Transport(_) => "TRANSPORT",
            TradeError::Timeout => "TIMEOUT",
            TradeError::HttpStatus { .. } => "HTTP_STATUS",
            TradeError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            TradeError::InvalidQuote(_) => "INVALID_QUOTE",
            TradeError::InvalidBalance(_) => "INVALID_BALANCE",
            TradeError::Sizing(_) => "SIZING",
            TradeError::CloseIncomplete { .. } => "CLOSE_INCOMPLETE",
            TradeError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
        }
    }
}

impl From<reqwest::Error> for TradeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TradeError::Timeout
        } else {
            TradeError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TradeError {
    fn from(e: serde_json::Error) -> Self {
        TradeError::MalformedResponse(e.to_string())
    }
}
