//! `POST /weather`

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use clima_common::CepRequest;
use clima_errors::{AppError, AppResult};
use clima_telemetry::{record_request, TracePropagator};
use tracing::{field, info_span, warn, Instrument, Span};

use crate::forward::{Relayed, ResolutionClient};

/// 路由状态
#[derive(Clone)]
pub struct GatewayState {
    pub resolution: ResolutionClient,
    pub propagator: TracePropagator,
}

/// 网关路由
pub fn api_routes(state: GatewayState) -> Router {
    Router::new()
        .route("/weather", any(weather))
        .with_state(state)
}

async fn weather(
    State(state): State<GatewayState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let span = info_span!(
        "gateway.handle",
        cep = field::Empty,
        outcome = field::Empty
    );
    state.propagator.set_parent(&span, &headers);

    let result = handle(&state, &method, &body).instrument(span.clone()).await;

    let outcome = match &result {
        Ok(_) => "relayed",
        Err(e) => {
            span.in_scope(|| warn!(status = e.status_code(), error = %e, "Request failed"));
            e.kind()
        }
    };
    span.record("outcome", outcome);
    record_request("gateway", outcome);

    result.map(|relayed| {
        (
            relayed.status,
            [(header::CONTENT_TYPE, "application/json")],
            relayed.body,
        )
            .into_response()
    })
}

async fn handle(state: &GatewayState, method: &Method, body: &[u8]) -> AppResult<Relayed> {
    if *method != Method::POST {
        return Err(AppError::method_not_allowed("Method not allowed"));
    }

    let request =
        CepRequest::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON payload"))?;
    let cep = request
        .validate()
        .map_err(|_| AppError::unprocessable("invalid zipcode"))?;
    Span::current().record("cep", cep.as_str());

    state
        .resolution
        .forward(&cep)
        .await
        .map_err(|_| AppError::internal("Failed to contact Weather App"))
}
