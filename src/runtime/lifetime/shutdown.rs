use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::signal;
use tracing::{error, info, warn};

use crate::analytics::VisitRecorder;

/// 等待 Ctrl+C，然后让 server 停止接收新连接并处理完进行中的请求
pub async fn listen_for_shutdown(server: ServerHandle) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping HTTP server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    server.stop(true).await;
}

/// 排空访问记录队列，超时后放弃剩余记录
pub async fn drain_visits(recorder: &VisitRecorder, drain_timeout: Duration) -> bool {
    let pending = recorder.pending();
    if pending == 0 {
        info!("Visit queue is empty");
        return true;
    }

    info!("Draining {} pending visits...", pending);
    if recorder.wait_idle(drain_timeout).await {
        info!("Flushed {} pending visits", pending);
        true
    } else {
        error!(
            "Visit queue drain timed out after {:?}, {} visits not persisted",
            drain_timeout,
            recorder.pending()
        );
        false
    }
}
