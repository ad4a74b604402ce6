//! 转发到天气解析服务

use std::time::Duration;

use axum::body::Bytes;
use clima_common::{Cep, CepRequest};
use clima_telemetry::{record_upstream, TracePropagator};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to contact weather service: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 上游原样返回的状态码与响应体
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Bytes,
}

/// 天气解析服务客户端
#[derive(Debug, Clone)]
pub struct ResolutionClient {
    http: reqwest::Client,
    url: String,
    propagator: TracePropagator,
}

impl ResolutionClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, propagator: TracePropagator) -> Self {
        Self {
            http,
            url: url.into(),
            propagator,
        }
    }

    /// 按配置构建，`timeout_secs` 未设置时沿用 reqwest 默认行为
    pub fn from_config(
        url: impl Into<String>,
        timeout_secs: Option<u64>,
        propagator: TracePropagator,
    ) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::new(builder.build()?, url, propagator))
    }

    /// 转发已校验的 CEP
    ///
    /// 上游的非 2xx 状态不算错误，只有连接或读取响应体失败才返回 [`ForwardError`]。
    #[instrument(name = "gateway.forward", skip_all, fields(cep = %cep))]
    pub async fn forward(&self, cep: &Cep) -> Result<Relayed, ForwardError> {
        let result = self.send(cep).await;
        match &result {
            Ok(relayed) => {
                debug!(status = relayed.status.as_u16(), "Weather service responded");
                record_upstream("resolution", "ok");
            }
            Err(e) => {
                warn!(error = %e, "Forward failed");
                record_upstream("resolution", "error");
            }
        }
        result
    }

    async fn send(&self, cep: &Cep) -> Result<Relayed, ForwardError> {
        let response = self
            .http
            .post(&self.url)
            .headers(self.propagator.outgoing_headers())
            .json(&CepRequest::from(cep.clone()))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        Ok(Relayed { status, body })
    }
}
