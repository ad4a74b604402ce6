//! `POST /getWeather`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    routing::any,
    Json, Router,
};
use clima_common::CepRequest;
use clima_errors::{AppError, AppResult};
use clima_telemetry::{record_request, TracePropagator};
use tracing::{field, info_span, warn, Instrument, Span};

use crate::domain::WeatherResponse;
use crate::service::WeatherResolver;

/// 路由状态
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<WeatherResolver>,
    pub propagator: TracePropagator,
}

impl AppState {
    pub fn new(resolver: WeatherResolver, propagator: TracePropagator) -> Self {
        Self {
            resolver: Arc::new(resolver),
            propagator,
        }
    }
}

/// 天气查询路由
///
/// 用 `any` 注册，由处理函数自己返回 405，保证校验顺序和错误体格式一致。
pub fn weather_routes(state: AppState) -> Router {
    Router::new()
        .route("/getWeather", any(get_weather))
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WeatherResponse>> {
    let span = info_span!(
        "weather.handle",
        cep = field::Empty,
        outcome = field::Empty
    );
    state.propagator.set_parent(&span, &headers);

    let result = handle(&state, &method, &body).instrument(span.clone()).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => {
            span.in_scope(|| warn!(status = e.status_code(), error = %e, "Request failed"));
            e.kind()
        }
    };
    span.record("outcome", outcome);
    record_request("weather", outcome);

    result.map(Json)
}

async fn handle(state: &AppState, method: &Method, body: &[u8]) -> AppResult<WeatherResponse> {
    if *method != Method::POST {
        return Err(AppError::method_not_allowed("Method not allowed"));
    }

    let request =
        CepRequest::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON payload"))?;
    let cep = request
        .validate()
        .map_err(|_| AppError::unprocessable("invalid zipcode"))?;
    Span::current().record("cep", cep.as_str());

    Ok(state.resolver.resolve(&cep).await?)
}
