//! 外部 API 客户端

pub mod postal;
pub mod weather;

pub use postal::{PostalClient, PostalLookupError};
pub use weather::{WeatherClient, WeatherLookupError};

use std::time::Duration;

/// 构建进程内共享的 HTTP 客户端
///
/// 未配置超时时沿用 reqwest 默认行为。
pub fn build_http_client(timeout_secs: Option<u64>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}
