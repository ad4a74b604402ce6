//! 运维端点
//!
//! 提供 /health 和 /metrics

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

/// 存活检查响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// 构建运维路由
///
/// 未安装 metrics recorder 时 `/metrics` 返回 404。
pub fn ops_routes(service: &str, metrics: Option<PrometheusHandle>) -> Router {
    let service = service.to_string();
    let router = Router::new().route(
        "/health",
        get(move || {
            let service = service.clone();
            async move {
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    service,
                    version: env!("CARGO_PKG_VERSION").to_string(),
                })
            }
        }),
    );

    match metrics {
        Some(handle) => router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move {
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                        handle.render(),
                    )
                        .into_response()
                }
            }),
        ),
        None => router,
    }
}
