//! Per-request broker credentials

use std::fmt;

/// Broker credentials supplied by the caller for one trade invocation
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub account_id: String,
    pub base_url: String,
}

impl Credentials {
    /// Create credentials, rejecting empty fields
    pub fn new(api_key: &str, account_id: &str, base_url: &str) -> Result<Self, String> {
        if api_key.is_empty() {
            return Err("api_key cannot be empty".to_string());
        }
        if account_id.is_empty() {
            return Err("account_id cannot be empty".to_string());
        }
        if base_url.is_empty() {
            return Err("base_url cannot be empty".to_string());
        }

        Ok(Self {
            api_key: api_key.to_string(),
            account_id: account_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root URL for every account-scoped endpoint
    pub fn account_url(&self) -> String {
        format!("{}/{}", self.base_url, self.account_id)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}
