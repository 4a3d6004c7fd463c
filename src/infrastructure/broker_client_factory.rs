//! Broker Client Factory
//!
//! Credentials arrive with every trade request, so a broker client is built per
//! request rather than once at startup. The factory trait lets the HTTP layer be
//! tested without a real broker.

use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::BrokerClient;
use crate::domain::value_objects::credentials::Credentials;
use crate::infrastructure::oanda_client::OandaClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Builds a broker client for one set of credentials
pub trait BrokerClientFactory: Send + Sync {
    fn create(&self, credentials: Credentials) -> Result<Arc<dyn BrokerClient>, TradeError>;
}

/// Factory producing `OandaClient`s that share one request timeout
pub struct OandaClientFactory {
    timeout: Duration,
}

impl OandaClientFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl BrokerClientFactory for OandaClientFactory {
    fn create(&self, credentials: Credentials) -> Result<Arc<dyn BrokerClient>, TradeError> {
        debug!("Creating broker client for {:?}", credentials);
        match OandaClient::new(credentials, self.timeout) {
            Ok(client) => Ok(Arc::new(client) as Arc<dyn BrokerClient>),
            Err(e) => {
                error!("✗ Failed to create broker client: {}", e);
                Err(e)
            }
        }
    }
}
