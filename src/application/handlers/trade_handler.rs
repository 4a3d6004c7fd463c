use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::RiskParameters;
use crate::domain::entities::direction::TradeDirection;
use crate::domain::entities::trade::TradeResult;
use crate::domain::services::trade_orchestrator::{OrchestrationError, TradeOrchestrator, TradeStage};
use crate::domain::value_objects::credentials::Credentials;
use crate::infrastructure::broker_client_factory::BrokerClientFactory;

const MISSING_FIELDS: &str = "Something is missing in the request";
const WRONG_ACTION: &str = "Wrong action";
const BODY_TOO_LARGE: &str = "Request body is too large";

/// Shared, read-only state for the trade endpoints
#[derive(Clone)]
pub struct AppState {
    pub risk: RiskParameters,
    pub brokers: Arc<dyn BrokerClientFactory>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<TradeStage>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            stage: None,
        }),
    )
}

fn payload_too_large() -> ApiError {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(ErrorResponse {
            error: BODY_TOO_LARGE.to_string(),
            stage: None,
        }),
    )
}

fn trade_failure(e: OrchestrationError) -> ApiError {
    let status = if e.source.is_gateway_failure() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.source.to_string(),
            stage: Some(e.stage),
        }),
    )
}

/// Fields of a trade trigger
///
/// Every field must be present and truthy (not null, false, 0 or ""). The
/// credentials must also be strings; a non-string action is only rejected
/// later, as a wrong action.
#[derive(Debug)]
struct TradeRequest<'a> {
    action: &'a Value,
    api_key: &'a str,
    account_id: &'a str,
    base_url: &'a str,
}

impl<'a> TradeRequest<'a> {
    fn from_payload(payload: &'a Value) -> Option<Self> {
        let field = move |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
        };

        Some(Self {
            action: payload.get("action").filter(|value| is_truthy(value))?,
            api_key: field("apiKey")?,
            account_id: field("accountId")?,
            base_url: field("baseUrl")?,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Rewrite the body-limit rejection from tower-http into the JSON error shape
async fn json_body_limit(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map_or(false, |ct| ct.as_bytes().starts_with(b"application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        warn!("Rejected trade request: body exceeds the configured limit");
        return payload_too_large().into_response();
    }
    response
}

/// Build the HTTP router
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/trade", post(trade))
        .route("/health", get(health_check))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::map_response(json_body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "running" }))
}

/// Close any open exposure and open a protected position in the requested direction
pub async fn trade(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TradeResult>, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Rejected trade request body: {}", rejection);
            return Err(payload_too_large());
        }
        Err(rejection) => {
            warn!("Rejected trade request body: {}", rejection);
            return Err(bad_request(MISSING_FIELDS));
        }
    };

    let request = TradeRequest::from_payload(&payload).ok_or_else(|| {
        warn!("Trade request is missing a required field");
        bad_request(MISSING_FIELDS)
    })?;

    let direction: TradeDirection = request
        .action
        .as_str()
        .ok_or_else(|| format!("Unknown trade direction: {}", request.action))
        .and_then(|action| action.parse::<TradeDirection>())
        .map_err(|e| {
            warn!("{}", e);
            bad_request(WRONG_ACTION)
        })?;

    let credentials = Credentials::new(request.api_key, request.account_id, request.base_url)
        .map_err(|_| bad_request(MISSING_FIELDS))?;
    info!(
        "Trade request: {} for account {}",
        direction, credentials.account_id
    );

    let broker = state.brokers.create(credentials).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                stage: None,
            }),
        )
    })?;

    TradeOrchestrator::new(broker, state.risk)
        .make_trade(direction)
        .await
        .map(Json)
        .map_err(trade_failure)
}
