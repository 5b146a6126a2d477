use tokio::signal;
use tracing::{error, warn};

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        error!("监听 Ctrl+C 信号失败: {}", e);
        // 无法监听信号时保持服务运行
        std::future::pending::<()>().await;
    }
    warn!("收到关闭信号，开始优雅关闭...");
}
