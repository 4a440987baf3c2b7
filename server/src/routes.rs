//! HTTP routes for conversions and overrides.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use ratecalc_common::{Currency, CurrencyPair};
use ratecalc_fx::{ConversionResult, FxError, OverrideAck, RateEngine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Service name reported by the root endpoint.
pub const SERVICE_NAME: &str = "Fx Rate Calculator";

const CURRENCY_CODE_LEN: usize = 3;

/// Shared state handed to every handler.
pub struct AppState {
    pub engine: Arc<RateEngine>,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be parsed or is out of range.
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Fx(#[from] FxError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Fx(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Fx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let rates = Router::new()
        .route("/rates/fx-rate", get(get_fx_rate))
        .route("/rates/fx-rate/override", post(override_fx_rate))
        .route("/rates/fx-rate/clear", delete(clear_fx_rate));

    Router::new()
        .route("/", get(root))
        .nest("/v1", rates)
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn check_code(field: &str, value: &str) -> Result<(), ApiError> {
    if value.chars().count() != CURRENCY_CODE_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "{field} must be exactly {CURRENCY_CODE_LEN} characters, got {value:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct FxRateQuery {
    pub ccy_from: String,
    pub ccy_to: String,
    pub quantity: u64,
}

async fn get_fx_rate(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FxRateQuery>, QueryRejection>,
) -> Result<Json<ConversionResult>, ApiError> {
    let Query(query) = query?;
    check_code("ccy_from", &query.ccy_from)?;
    check_code("ccy_to", &query.ccy_to)?;
    if query.quantity == 0 {
        return Err(ApiError::InvalidRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    info!(
        ccy_from = %query.ccy_from,
        ccy_to = %query.ccy_to,
        quantity = query.quantity,
        "Get fx rate"
    );

    let result = state
        .engine
        .get_rate(&query.ccy_from, &query.ccy_to, query.quantity)
        .await
        .map_err(|e| {
            error!(error = %e, "Error getting fx rate");
            e
        })?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub ccy_from: String,
    pub ccy_to: String,
    pub fx_rate: f64,
}

async fn override_fx_rate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OverrideRequest>, JsonRejection>,
) -> Result<Json<OverrideAck>, ApiError> {
    let Json(payload) = payload?;
    check_code("ccy_from", &payload.ccy_from)?;
    check_code("ccy_to", &payload.ccy_to)?;
    if !payload.fx_rate.is_finite() || payload.fx_rate <= 0.0 {
        return Err(ApiError::InvalidRequest(
            "fx_rate must be greater than 0".to_string(),
        ));
    }

    let pair = CurrencyPair::new(
        Currency::new(payload.ccy_from),
        Currency::new(payload.ccy_to),
    );

    let ack = state
        .engine
        .set_override(&pair, payload.fx_rate)
        .map_err(|e| {
            error!(pair = %pair, error = %e, "Error setting fx rate override");
            e
        })?;

    Ok(Json(ack))
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub ccy_pair: String,
}

async fn clear_fx_rate(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ClearQuery>, QueryRejection>,
) -> Result<Json<OverrideAck>, ApiError> {
    let Query(query) = query?;

    let len = query.ccy_pair.chars().count();
    if !(6..=7).contains(&len) {
        return Err(ApiError::InvalidRequest(format!(
            "ccy_pair must be 6 or 7 characters, got {:?}",
            query.ccy_pair
        )));
    }

    let pair = CurrencyPair::from_key(&query.ccy_pair).map_err(FxError::from)?;
    Ok(Json(state.engine.clear_override(&pair)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use ratecalc_fx::{MockPriceSource, OverrideStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        engine: Arc<RateEngine>,
        source: Arc<MockPriceSource>,
    }

    fn test_app() -> TestApp {
        let source = Arc::new(MockPriceSource::new("test"));
        source.set_price("USD", 111126.78);
        source.set_price("GBP", 86653.33);

        let engine = Arc::new(RateEngine::new(
            source.clone(),
            Arc::new(OverrideStore::new()),
        ));
        let router = create_router(Arc::new(AppState {
            engine: engine.clone(),
        }));

        TestApp {
            router,
            engine,
            source,
        }
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_root() {
        let app = test_app();
        let (status, body) = send(app.router, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_fx_rate_success() {
        let app = test_app();
        let (status, body) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=usd&ccy_to=gbp&quantity=1000",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "GBP");
        assert!((body["quantity"].as_f64().unwrap() - 779.77).abs() < 1e-9);
        assert_eq!(app.source.calls(), vec![Currency::usd(), Currency::gbp()]);
    }

    #[tokio::test]
    async fn test_fx_rate_bad_currency_length() {
        let app = test_app();
        let (status, body) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=US&ccy_to=GBP&quantity=1000",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("ccy_from"));
        assert_eq!(app.source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fx_rate_quantity_must_be_positive() {
        let app = test_app();
        let (status, _) = send(
            app.router.clone(),
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=USD&ccy_to=GBP&quantity=0",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=USD&ccy_to=GBP&quantity=-5",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fx_rate_missing_param() {
        let app = test_app();
        let (status, body) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=USD&ccy_to=GBP",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_fx_rate_upstream_failure_is_500() {
        let app = test_app();
        app.source.fail_with("USD", "upstream returned 503 Service Unavailable");

        let (status, body) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=USD&ccy_to=GBP&quantity=1000",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "Failed to get currency price for USD: upstream returned 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_override_then_convert() {
        let app = test_app();
        let (status, body) = send(
            app.router.clone(),
            Method::POST,
            "/v1/rates/fx-rate/override",
            Some(json!({"ccy_from": "usd", "ccy_to": "gbp", "fx_rate": 0.5})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"code": 200, "status": "Fx rate for USDGBP set to 0.5"})
        );

        let (status, body) = send(
            app.router,
            Method::GET,
            "/v1/rates/fx-rate?ccy_from=USD&ccy_to=GBP&quantity=3",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"currency": "GBP", "quantity": 1.5}));
        assert_eq!(app.source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_override_rejects_bad_payload() {
        let app = test_app();
        let (status, _) = send(
            app.router.clone(),
            Method::POST,
            "/v1/rates/fx-rate/override",
            Some(json!({"ccy_from": "usd", "ccy_to": "eur", "fx_rate": -1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            app.router,
            Method::POST,
            "/v1/rates/fx-rate/override",
            Some(json!({"ccy_from": "usd", "fx_rate": 1.2})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        assert!(app
            .engine
            .override_for(&CurrencyPair::new(Currency::usd(), Currency::eur()))
            .is_none());
    }

    #[tokio::test]
    async fn test_clear_accepts_slash_and_lowercase() {
        let app = test_app();
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        app.engine.set_override(&pair, 1.234).unwrap();

        let (status, body) = send(
            app.router,
            Method::DELETE,
            "/v1/rates/fx-rate/clear?ccy_pair=usd/eur",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"code": 200, "status": "Fx rate set for USDEUR is cleared"})
        );
        assert!(app.engine.override_for(&pair).is_none());
    }

    #[tokio::test]
    async fn test_clear_missing_override_succeeds() {
        let app = test_app();
        let (status, body) = send(
            app.router,
            Method::DELETE,
            "/v1/rates/fx-rate/clear?ccy_pair=GBPUSD",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
    }

    #[tokio::test]
    async fn test_clear_invalid_pair() {
        let app = test_app();
        let (status, body) = send(
            app.router.clone(),
            Method::DELETE,
            "/v1/rates/fx-rate/clear?ccy_pair=USD-EU",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid currency pair: USD-EU");

        let (status, _) = send(
            app.router,
            Method::DELETE,
            "/v1/rates/fx-rate/clear?ccy_pair=USD",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
