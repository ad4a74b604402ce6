//! 邮编 → 城市（ViaCEP）

use clima_common::Cep;
use clima_telemetry::{record_upstream, TracePropagator};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum PostalLookupError {
    #[error("failed to fetch city: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to fetch city: upstream returned {0}")]
    Status(StatusCode),

    #[error("invalid CEP")]
    InvalidCep,

    #[error("could not find city")]
    CityNotFound,
}

/// ViaCEP 响应中关心的字段
///
/// 上游不保证结构，两个字段都可能缺失。
#[derive(Debug, Default, Deserialize)]
struct ViaCepResponse {
    /// 上游自己的"未找到"标记，通常是 `true`，也见过字符串 `"true"`
    #[serde(default)]
    erro: Option<Value>,
    #[serde(default)]
    localidade: Option<Value>,
}

impl ViaCepResponse {
    fn has_error_marker(&self) -> bool {
        !matches!(self.erro, None | Some(Value::Null) | Some(Value::Bool(false)))
    }
}

/// 邮编查询客户端
#[derive(Debug, Clone)]
pub struct PostalClient {
    http: reqwest::Client,
    base_url: String,
    propagator: TracePropagator,
}

impl PostalClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, propagator: TracePropagator) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            propagator,
        }
    }

    fn url_for(&self, cep: &Cep) -> String {
        format!("{}/{}/json/", self.base_url.trim_end_matches('/'), cep)
    }

    /// 查询 CEP 对应的城市名
    #[instrument(name = "postal.lookup", skip_all, fields(cep = %cep))]
    pub async fn city_for(&self, cep: &Cep) -> Result<String, PostalLookupError> {
        let result = self.fetch(cep).await;
        match &result {
            Ok(city) => {
                debug!(city = %city, "City resolved");
                record_upstream("postal", "ok");
            }
            Err(e) => {
                warn!(error = %e, "City lookup failed");
                record_upstream("postal", "error");
            }
        }
        result
    }

    async fn fetch(&self, cep: &Cep) -> Result<String, PostalLookupError> {
        let response = self
            .http
            .get(self.url_for(cep))
            .headers(self.propagator.outgoing_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostalLookupError::Status(status));
        }

        let body = response.bytes().await?;
        // 无法解析的响应体按"没有城市字段"处理
        let payload: ViaCepResponse = serde_json::from_slice(&body).unwrap_or_default();

        if payload.has_error_marker() {
            return Err(PostalLookupError::InvalidCep);
        }

        match payload.localidade {
            Some(Value::String(city)) => Ok(city),
            _ => Err(PostalLookupError::CityNotFound),
        }
    }
}
