use crate::domain::entities::order::{MarketOrder, INSTRUMENT};
use crate::domain::entities::trade::{OpenTrade, OrderFill};
use crate::domain::errors::TradeError;
use crate::domain::repositories::broker_client::{BrokerClient, BrokerResult};
use crate::domain::value_objects::credentials::Credentials;
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Upper bound on trades returned by one listing call
const MAX_OPEN_TRADES: u32 = 500;

/// Broker numbers arrive either as JSON numbers or as decimal strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Number(f64),
    Text(String),
}

fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberRepr::deserialize(deserializer)? {
        NumberRepr::Number(n) => Ok(n),
        NumberRepr::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    })
}

/// `GET /{account}/pricing`
#[derive(Debug, Deserialize)]
struct PricingResponse {
    #[serde(default)]
    prices: Vec<PricingEntry>,
}

#[derive(Debug, Deserialize)]
struct PricingEntry {
    #[serde(default)]
    bids: Vec<PriceBucket>,
}

#[derive(Debug, Deserialize)]
struct PriceBucket {
    #[serde(deserialize_with = "de_f64")]
    price: f64,
}

/// `GET /{account}`
#[derive(Debug, Deserialize)]
struct AccountResponse {
    account: AccountBody,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    #[serde(deserialize_with = "de_f64")]
    balance: f64,
}

/// `GET /{account}/trades`
#[derive(Debug, Deserialize)]
struct TradesResponse {
    trades: Vec<TradeEntry>,
}

#[derive(Debug, Deserialize)]
struct TradeEntry {
    #[serde(deserialize_with = "de_id")]
    id: String,
}

/// `POST /{account}/orders`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_fill_transaction: Option<FillTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FillTransaction {
    trade_opened: Option<TradeOpened>,
}

#[derive(Debug, Deserialize)]
struct TradeOpened {
    #[serde(rename = "tradeID", deserialize_with = "de_id")]
    trade_id: String,
    #[serde(deserialize_with = "de_f64")]
    price: f64,
}

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    order: &'a MarketOrder,
}

#[derive(Debug, Serialize)]
struct CloseRequest {
    units: &'static str,
}

#[derive(Debug, Serialize)]
struct PriceSpec {
    price: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProtectionRequest {
    take_profit: PriceSpec,
    stop_loss: PriceSpec,
}

impl From<&ProtectiveLevels> for ProtectionRequest {
    fn from(levels: &ProtectiveLevels) -> Self {
        let (stop_loss, take_profit) = levels.as_price_strings();
        Self {
            take_profit: PriceSpec { price: take_profit },
            stop_loss: PriceSpec { price: stop_loss },
        }
    }
}

/// OANDA v20-style REST client, bound to one account
pub struct OandaClient {
    client: Client,
    credentials: Credentials,
}

impl OandaClient {
    /// Create a client whose every request times out after `timeout`
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, TradeError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(Self::default_headers(&credentials.api_key)?)
            .build()
            .map_err(|e| TradeError::InvalidConfiguration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Headers sent on every request
    fn default_headers(api_key: &str) -> Result<HeaderMap, TradeError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            TradeError::InvalidConfiguration("api key contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("accept-datetime-format"),
            HeaderValue::from_static("Unix"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Path under `/trades/{id}`, accepting only the broker's numeric trade ids
    fn trade_path(trade_id: &str, suffix: &str) -> BrokerResult<String> {
        if trade_id.is_empty() || !trade_id.bytes().all(|b| b.is_ascii_digit()) {
            error!("Refusing to build a request for trade id {:?}", trade_id);
            return Err(TradeError::MalformedResponse(format!(
                "trade id {:?} is not numeric",
                trade_id
            )));
        }
        Ok(format!("/trades/{}/{}", trade_id, suffix))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.credentials.account_url(), path)
    }

    /// Send a request and return the body of a 200/201 response
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> BrokerResult<String> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, url, e);
            TradeError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(TradeError::from)?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            error!("{} {} returned {}: {}", method, url, status, text);
            return Err(TradeError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn parse<T: DeserializeOwned>(body: &str) -> BrokerResult<T> {
        serde_json::from_str(body).map_err(|e| {
            error!("Unexpected broker response ({}): {}", e, body);
            TradeError::MalformedResponse(e.to_string())
        })
    }

    fn parse_bid(body: &str) -> BrokerResult<f64> {
        let pricing: PricingResponse = Self::parse(body)?;
        pricing
            .prices
            .first()
            .and_then(|entry| entry.bids.first())
            .map(|bucket| bucket.price)
            .ok_or_else(|| TradeError::InvalidQuote("no bid price in pricing response".to_string()))
    }

    fn parse_balance(body: &str) -> BrokerResult<f64> {
        let account: AccountResponse = Self::parse(body)?;
        Ok(account.account.balance)
    }

    fn parse_trades(body: &str) -> BrokerResult<Vec<OpenTrade>> {
        let trades: TradesResponse = Self::parse(body)?;
        Ok(trades
            .trades
            .into_iter()
            .map(|t| OpenTrade { id: t.id })
            .collect())
    }

    fn parse_fill(body: &str) -> BrokerResult<OrderFill> {
        let response: OrderResponse = Self::parse(body)?;
        let opened = response
            .order_fill_transaction
            .and_then(|fill| fill.trade_opened)
            .ok_or_else(|| {
                TradeError::MalformedResponse(format!("order did not open a trade: {}", body))
            })?;

        Ok(OrderFill {
            trade_id: opened.trade_id,
            price: opened.price,
        })
    }
}

#[async_trait]
impl BrokerClient for OandaClient {
    fn name(&self) -> &str {
        "OANDA"
    }

    async fn get_bid_price(&self) -> BrokerResult<f64> {
        let path = format!("/pricing?instruments={}", INSTRUMENT);
        let body = self.send::<()>(Method::GET, &path, None).await?;
        Self::parse_bid(&body)
    }

    async fn get_account_balance(&self) -> BrokerResult<f64> {
        let body = self.send::<()>(Method::GET, "", None).await?;
        Self::parse_balance(&body)
    }

    async fn list_open_trades(&self) -> BrokerResult<Vec<OpenTrade>> {
        let path = format!("/trades?state=OPEN&count={}", MAX_OPEN_TRADES);
        let body = self.send::<()>(Method::GET, &path, None).await?;
        Self::parse_trades(&body)
    }

    async fn close_trade(&self, trade_id: &str) -> BrokerResult<()> {
        let path = Self::trade_path(trade_id, "close")?;
        self.send(Method::PUT, &path, Some(&CloseRequest { units: "ALL" }))
            .await?;
        Ok(())
    }

    async fn submit_market_order(&self, order: &MarketOrder) -> BrokerResult<OrderFill> {
        let body = self
            .send(Method::POST, "/orders", Some(&OrderRequest { order }))
            .await?;
        let fill = Self::parse_fill(&body)?;
        info!("Order filled, trade {} opened @ {}", fill.trade_id, fill.price);
        Ok(fill)
    }

    async fn attach_protection(
        &self,
        trade_id: &str,
        levels: &ProtectiveLevels,
    ) -> BrokerResult<()> {
        let path = Self::trade_path(trade_id, "orders")?;
        self.send(Method::PUT, &path, Some(&ProtectionRequest::from(levels)))
            .await?;
        Ok(())
    }
}
