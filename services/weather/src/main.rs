//! 天气解析服务
//!
//! `POST /getWeather`：CEP → 城市（ViaCEP）→ 当前气温（WeatherAPI）→ 三种温标

mod api;
mod clients;
mod domain;
mod service;

use clima_bootstrap::{init_runtime, ops_routes, serve};
use clima_config::WeatherServiceConfig;
use clima_telemetry::{init_metrics, TracePropagator};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{weather_routes, AppState};
use crate::clients::{build_http_client, PostalClient, WeatherClient};
use crate::service::WeatherResolver;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 加载配置
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = WeatherServiceConfig::load(&config_dir)?;

    // 初始化日志与追踪
    let _telemetry = init_runtime(&config.app_name, &config.app_env, &config.telemetry)?;

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    // 共享的 HTTP 客户端与追踪传播器
    let http = build_http_client(config.upstream.timeout_secs)?;
    let propagator = TracePropagator::w3c();

    let resolver = WeatherResolver::new(
        PostalClient::new(
            http.clone(),
            config.upstream.postal_base_url.clone(),
            propagator.clone(),
        ),
        WeatherClient::new(
            http,
            config.upstream.weather_base_url.clone(),
            config.upstream.weather_api_key.clone(),
            propagator.clone(),
        ),
    );

    let app = weather_routes(AppState::new(resolver, propagator))
        .merge(ops_routes(&config.app_name, metrics))
        .layer(TraceLayer::new_for_http());

    info!(
        postal = %config.upstream.postal_base_url,
        weather = %config.upstream.weather_base_url,
        "Starting {}",
        config.app_name
    );

    serve(app, &config.server.bind_addr()).await?;

    Ok(())
}
