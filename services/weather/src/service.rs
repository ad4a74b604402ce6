//! 两跳查询编排：CEP → 城市 → 气温

use clima_common::Cep;
use clima_errors::AppError;
use thiserror::Error;
use tracing::info;

use crate::clients::{PostalClient, PostalLookupError, WeatherClient, WeatherLookupError};
use crate::domain::WeatherResponse;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// 上游 HTTP 错误、"未找到"标记、缺少城市字段都归为这一类
    #[error("can not find zipcode")]
    City(#[source] PostalLookupError),

    #[error("failed to get weather data")]
    Weather(#[source] WeatherLookupError),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::City(_) => AppError::not_found(err.to_string()),
            ResolveError::Weather(_) => AppError::internal(err.to_string()),
        }
    }
}

/// 天气解析器
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    postal: PostalClient,
    weather: WeatherClient,
}

impl WeatherResolver {
    pub fn new(postal: PostalClient, weather: WeatherClient) -> Self {
        Self { postal, weather }
    }

    /// 依次查询城市和气温，城市查询失败时不会发起天气查询
    pub async fn resolve(&self, cep: &Cep) -> Result<WeatherResponse, ResolveError> {
        let city = self.postal.city_for(cep).await.map_err(ResolveError::City)?;
        let celsius = self
            .weather
            .celsius_for(&city)
            .await
            .map_err(ResolveError::Weather)?;

        let response = WeatherResponse::from_celsius(city, celsius);
        info!(
            cep = %cep,
            city = %response.city,
            temp_c = response.temp_c,
            "Weather resolved"
        );
        Ok(response)
    }
}
