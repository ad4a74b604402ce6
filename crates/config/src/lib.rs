//! clima-config - 配置加载库
//!
//! 加载顺序（后者覆盖前者）：
//! 1. `{config_dir}/default.toml`
//! 2. `{config_dir}/{APP_ENV}.toml`
//! 3. `OTEL_EXPORTER_OTLP_ENDPOINT`
//! 4. `CLIMA_` 前缀的环境变量，嵌套键用 `__` 分隔（如 `CLIMA_SERVER__PORT`）

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use secrecy::Secret;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP HTTP 导出端点，未设置时只在本地输出日志
    pub otlp_endpoint: Option<String>,
    pub service_name: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
            service_name: None,
        }
    }
}

/// Gateway 转发目标
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_resolution_url")]
    pub url: String,
    /// 未设置时沿用 HTTP 客户端默认行为（不超时）
    pub timeout_secs: Option<u64>,
}

fn default_resolution_url() -> String {
    "http://weather-app:9090/getWeather".to_string()
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            url: default_resolution_url(),
            timeout_secs: None,
        }
    }
}

/// 外部 API 配置（邮编查询 + 天气查询）
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_postal_base_url")]
    pub postal_base_url: String,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    pub weather_api_key: Secret<String>,
    pub timeout_secs: Option<u64>,
}

fn default_postal_base_url() -> String {
    "https://viacep.com.br/ws".to_string()
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1/current.json".to_string()
}

/// Gateway 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default = "default_gateway_server")]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

fn default_gateway_name() -> String {
    "zip_code_app".to_string()
}

fn default_gateway_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: 8080,
    }
}

impl GatewayConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let config: Self = load(config_dir)?;
        validate_url("resolution.url", &config.resolution.url)?;
        Ok(config)
    }
}

/// 天气解析服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherServiceConfig {
    #[serde(default = "default_weather_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default = "default_weather_server")]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub upstream: UpstreamConfig,
}

fn default_weather_name() -> String {
    "weather-app".to_string()
}

fn default_weather_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: 9090,
    }
}

impl WeatherServiceConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let config: Self = load(config_dir)?;
        validate_url("upstream.postal_base_url", &config.upstream.postal_base_url)?;
        validate_url("upstream.weather_base_url", &config.upstream.weather_base_url)?;
        Ok(config)
    }
}

fn default_app_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

fn load<T: DeserializeOwned>(config_dir: &str) -> Result<T, ConfigError> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Figment::new()
        .merge(Toml::file(format!("{}/default.toml", config_dir)))
        .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
        .merge(
            Env::raw()
                .only(&["OTEL_EXPORTER_OTLP_ENDPOINT"])
                .map(|_| "telemetry.otlp_endpoint".into()),
        )
        .merge(Env::prefixed("CLIMA_").split("__"))
        .extract()?;

    Ok(config)
}

/// 只接受 http/https 绝对地址
pub fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        field: field.to_string(),
        reason: format!("invalid URL '{}': {}", value, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: format!("unsupported URL scheme: {}", scheme),
        }),
    }
}
