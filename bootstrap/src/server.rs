//! HTTP 服务启动器

use axum::Router;
use tracing::info;

use crate::shutdown::shutdown_signal;

/// 绑定地址并运行 HTTP 服务，收到关闭信号后优雅退出
pub async fn serve(app: Router, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
