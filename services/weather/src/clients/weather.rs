//! 城市 → 当前气温（WeatherAPI）

use clima_telemetry::{record_upstream, TracePropagator};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum WeatherLookupError {
    #[error("failed to fetch weather data: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to fetch weather data: upstream returned {0}")]
    Status(StatusCode),

    #[error("failed to decode weather data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// WeatherAPI `current.json` 响应中关心的部分
///
/// `current` 或 `temp_c` 缺失时温度按 0 处理，与线上既有行为保持一致。
#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    #[serde(default)]
    current: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    temp_c: Option<f64>,
}

impl WeatherApiResponse {
    fn temp_c(&self) -> f64 {
        self.current
            .as_ref()
            .and_then(|current| current.temp_c)
            .unwrap_or_default()
    }
}

/// 天气查询客户端
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    propagator: TracePropagator,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish()
    }
}

impl WeatherClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Secret<String>,
        propagator: TracePropagator,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            propagator,
        }
    }

    /// 查询城市当前摄氏温度
    #[instrument(name = "weather.lookup", skip_all, fields(city = %city))]
    pub async fn celsius_for(&self, city: &str) -> Result<f64, WeatherLookupError> {
        let result = self.fetch(city).await;
        match &result {
            Ok(temp_c) => {
                debug!(temp_c, "Weather resolved");
                record_upstream("weather", "ok");
            }
            Err(e) => {
                warn!(error = %e, "Weather lookup failed");
                record_upstream("weather", "error");
            }
        }
        result
    }

    fn request(&self, city: &str) -> reqwest::RequestBuilder {
        // query() 按 application/x-www-form-urlencoded 编码，空格变为 '+'
        self.http
            .get(&self.base_url)
            .query(&[("key", self.api_key.expose_secret().as_str()), ("q", city)])
            .headers(self.propagator.outgoing_headers())
    }

    // 请求 URL 携带 API key，传输错误需去掉 URL 再向上传递
    async fn fetch(&self, city: &str) -> Result<f64, WeatherLookupError> {
        let response = self
            .request(city)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherLookupError::Status(status));
        }

        let body = response.bytes().await.map_err(reqwest::Error::without_url)?;
        let payload: WeatherApiResponse = serde_json::from_slice(&body)?;
        Ok(payload.temp_c())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> WeatherClient {
        WeatherClient::new(
            reqwest::Client::new(),
            server.url("/v1/current.json"),
            Secret::new("test-key".to_string()),
            TracePropagator::noop(),
        )
    }

    #[tokio::test]
    async fn test_temperature_found() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/current.json")
                    .query_param("key", "test-key")
                    .query_param("q", "São Paulo");
                then.status(200).json_body(json!({
                    "location": { "name": "Sao Paulo" },
                    "current": { "temp_c": 23.0, "temp_f": 73.4 }
                }));
            })
            .await;

        let temp = client(&server).celsius_for("São Paulo").await.unwrap();
        assert_eq!(temp, 23.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_city_is_form_encoded() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                // '&' 未编码时会被拆成两个参数，无法匹配
                when.method(GET)
                    .path("/v1/current.json")
                    .query_param("key", "test-key")
                    .query_param("q", "Rio de Janeiro & Co");
                then.status(200).json_body(json!({ "current": { "temp_c": 30.5 } }));
            })
            .await;

        let temp = client(&server).celsius_for("Rio de Janeiro & Co").await.unwrap();
        assert_eq!(temp, 30.5);
        mock.assert_async().await;
    }

    #[test]
    fn test_query_encoding() {
        let client = WeatherClient::new(
            reqwest::Client::new(),
            "http://localhost/v1/current.json",
            Secret::new("test-key".to_string()),
            TracePropagator::noop(),
        );
        let request = client.request("São Paulo").build().unwrap();
        assert_eq!(request.url().query(), Some("key=test-key&q=S%C3%A3o+Paulo"));

        let request = client.request("a/b?c=d").build().unwrap();
        assert_eq!(request.url().query(), Some("key=test-key&q=a%2Fb%3Fc%3Dd"));
    }

    #[tokio::test]
    async fn test_missing_temperature_defaults_to_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/current.json");
                then.status(200).json_body(json!({ "current": { "humidity": 80 } }));
            })
            .await;

        let temp = client(&server).celsius_for("Manaus").await.unwrap();
        assert_eq!(temp, 0.0);
    }

    #[tokio::test]
    async fn test_missing_current_defaults_to_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/current.json");
                then.status(200).json_body(json!({}));
            })
            .await;

        let temp = client(&server).celsius_for("Manaus").await.unwrap();
        assert_eq!(temp, 0.0);
    }

    #[tokio::test]
    async fn test_upstream_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/current.json");
                then.status(503);
            })
            .await;

        let err = client(&server).celsius_for("Manaus").await.unwrap_err();
        assert!(matches!(err, WeatherLookupError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/current.json");
                then.status(200).body("not json");
            })
            .await;

        let err = client(&server).celsius_for("Manaus").await.unwrap_err();
        assert!(matches!(err, WeatherLookupError::Decode(_)));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let client = WeatherClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/v1/current.json",
            Secret::new("super-secret-key".to_string()),
            TracePropagator::noop(),
        );

        let err = client.celsius_for("Manaus").await.unwrap_err();
        assert!(matches!(err, WeatherLookupError::Transport(_)));
        assert!(!err.to_string().contains("super-secret-key"));
        assert!(!format!("{:?}", err).contains("super-secret-key"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = WeatherClient::new(
            reqwest::Client::new(),
            "http://localhost/v1/current.json",
            Secret::new("super-secret-key".to_string()),
            TracePropagator::noop(),
        );
        assert!(!format!("{:?}", client).contains("super-secret-key"));
    }
}
