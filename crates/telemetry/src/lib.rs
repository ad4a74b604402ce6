//! telemetry - 可观测性库
//!
//! 日志（tracing-subscriber）、分布式追踪（OpenTelemetry，可选 OTLP 导出）、
//! 上下文传播（[`TracePropagator`]）与 Prometheus 指标。

mod recorder;
mod propagation;

pub use recorder::*;
pub use propagation::*;

use clima_config::TelemetryConfig;
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to build OTLP exporter: {0}")]
    Exporter(String),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),
}

/// 追踪导出守卫
///
/// 持有 tracer provider，drop 时刷新并关闭导出器。
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
    exporting: bool,
}

impl TelemetryGuard {
    /// 是否启用了 OTLP 导出
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
    }
}

/// 初始化 tracing（开发环境，人类可读格式）
pub fn init_tracing(
    config: &TelemetryConfig,
    default_service_name: &str,
) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let provider = build_provider(config, default_service_name)?;
    let otel_layer = otel_layer(&provider, config, default_service_name);

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(TelemetryGuard {
        provider: Some(provider),
        exporting: config.otlp_endpoint.is_some(),
    })
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(
    config: &TelemetryConfig,
    default_service_name: &str,
) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let provider = build_provider(config, default_service_name)?;
    let otel_layer = otel_layer(&provider, config, default_service_name);

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Ok(TelemetryGuard {
        provider: Some(provider),
        exporting: config.otlp_endpoint.is_some(),
    })
}

fn service_name<'a>(config: &'a TelemetryConfig, default_service_name: &'a str) -> &'a str {
    config.service_name.as_deref().unwrap_or(default_service_name)
}

/// 构建 tracer provider
///
/// 未配置 OTLP 端点时不挂导出器，span 仍带有效上下文，跨服务传播照常进行。
fn build_provider(
    config: &TelemetryConfig,
    default_service_name: &str,
) -> Result<SdkTracerProvider, TelemetryError> {
    let resource = Resource::builder_empty()
        .with_attributes([KeyValue::new(
            "service.name",
            service_name(config, default_service_name).to_string(),
        )])
        .build();

    let mut builder = SdkTracerProvider::builder().with_resource(resource);

    if let Some(endpoint) = config.otlp_endpoint.as_deref() {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(traces_endpoint(endpoint))
            .build()
            .map_err(|e| TelemetryError::Exporter(e.to_string()))?;
        builder = builder.with_batch_exporter(exporter);
    }

    Ok(builder.build())
}

/// OTLP/HTTP 的 span 接收路径
const TRACES_PATH: &str = "/v1/traces";

/// 代码中设置的端点会被原样使用，基础地址需补上 `/v1/traces`
fn traces_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.ends_with(TRACES_PATH) {
        endpoint.to_string()
    } else {
        format!("{endpoint}{TRACES_PATH}")
    }
}

fn otel_layer(
    provider: &SdkTracerProvider,
    config: &TelemetryConfig,
    default_service_name: &str,
) -> tracing_opentelemetry::OpenTelemetryLayer<
    tracing_subscriber::Registry,
    opentelemetry_sdk::trace::Tracer,
> {
    let tracer = provider.tracer(service_name(config, default_service_name).to_string());
    tracing_opentelemetry::layer().with_tracer(tracer)
}
