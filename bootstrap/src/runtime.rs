//! 服务运行时

use clima_config::TelemetryConfig;
use clima_telemetry::{init_tracing, init_tracing_json, TelemetryError, TelemetryGuard};
use tracing::info;

/// 初始化服务运行时
///
/// 生产环境输出 JSON 日志，其余环境输出人类可读格式。
/// 返回的守卫需要保持到进程退出，以便刷新未导出的 span。
pub fn init_runtime(
    app_name: &str,
    app_env: &str,
    telemetry: &TelemetryConfig,
) -> Result<TelemetryGuard, TelemetryError> {
    let guard = if app_env == "production" {
        init_tracing_json(telemetry, app_name)?
    } else {
        init_tracing(telemetry, app_name)?
    };

    info!(
        app_name = %app_name,
        app_env = %app_env,
        otlp_export = guard.is_exporting(),
        "Runtime initialized"
    );

    Ok(guard)
}
