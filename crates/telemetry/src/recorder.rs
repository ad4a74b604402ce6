//! Prometheus 指标

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::TelemetryError;

/// 入站请求计数
pub const REQUESTS_TOTAL: &str = "clima_requests_total";
/// 外部调用计数
pub const UPSTREAM_REQUESTS_TOTAL: &str = "clima_upstream_requests_total";

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, TelemetryError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::Metrics(e.to_string()))
}

/// 记录一次入站请求的结果
pub fn record_request(service: &'static str, outcome: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "service" => service, "outcome" => outcome).increment(1);
}

/// 记录一次外部调用的结果
pub fn record_upstream(upstream: &'static str, outcome: &'static str) {
    metrics::counter!(UPSTREAM_REQUESTS_TOTAL, "upstream" => upstream, "outcome" => outcome)
        .increment(1);
}
