//! Clima API Gateway
//!
//! `POST /weather`：校验 CEP 后转发到天气解析服务，原样返回其状态码与响应体

mod forward;
mod routing;

use clima_bootstrap::{init_runtime, ops_routes, serve};
use clima_config::GatewayConfig;
use clima_telemetry::{init_metrics, TracePropagator};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::forward::ResolutionClient;
use crate::routing::{api_routes, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 加载配置
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = GatewayConfig::load(&config_dir)?;

    // 初始化 tracing
    let _telemetry = init_runtime(&config.app_name, &config.app_env, &config.telemetry)?;

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    let propagator = TracePropagator::w3c();
    let resolution = ResolutionClient::from_config(
        config.resolution.url.clone(),
        config.resolution.timeout_secs,
        propagator.clone(),
    )?;

    // 构建路由
    let app = api_routes(GatewayState {
        resolution,
        propagator,
    })
    .merge(ops_routes(&config.app_name, metrics))
    .layer(TraceLayer::new_for_http());

    info!(resolution = %config.resolution.url, "Starting gateway");

    serve(app, &config.server.bind_addr()).await?;

    Ok(())
}
