//! 异步访问记录器
//!
//! 重定向只负责 `try_send`，后台单个 worker 顺序落库。
//! 队列满时直接丢弃并计数，绝不阻塞重定向响应。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{VisitDetail, VisitSink};

pub struct VisitRecorder {
    tx: mpsc::Sender<VisitDetail>,
    /// 已入队但尚未处理完的数量
    pending: Arc<AtomicUsize>,
    dropped: AtomicU64,
}

impl VisitRecorder {
    /// 创建记录器并在当前 tokio runtime 上启动 worker
    pub fn start(sink: Arc<dyn VisitSink>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let pending = Arc::new(AtomicUsize::new(0));

        tokio::spawn(run_worker(sink, rx, Arc::clone(&pending)));

        Self {
            tx,
            pending,
            dropped: AtomicU64::new(0),
        }
    }

    /// 入队一次访问，返回是否入队成功
    pub fn record(&self, detail: VisitDetail) -> bool {
        self.pending.fetch_add(1, Ordering::SeqCst);
        match self.tx.try_send(detail) {
            Ok(()) => true,
            Err(e) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                match e {
                    mpsc::error::TrySendError::Full(detail) => warn!(
                        "Visit queue full, dropping visit for url {} ({} dropped so far)",
                        detail.url_id, total
                    ),
                    mpsc::error::TrySendError::Closed(detail) => warn!(
                        "Visit recorder stopped, dropping visit for url {}",
                        detail.url_id
                    ),
                }
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// 等待队列排空，超时返回 false
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = async {
            while self.pending() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }
}

async fn run_worker(
    sink: Arc<dyn VisitSink>,
    mut rx: mpsc::Receiver<VisitDetail>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(detail) = rx.recv().await {
        persist(sink.as_ref(), &detail).await;
        pending.fetch_sub(1, Ordering::SeqCst);
    }
    debug!("Visit recorder worker exited");
}

/// 两步各自失败只记日志；写访问行失败也照样尝试计数
async fn persist(sink: &dyn VisitSink, detail: &VisitDetail) {
    if let Err(e) = sink.insert_visit(detail).await {
        warn!("Failed to insert visit for url {}: {}", detail.url_id, e);
    }
    if let Err(e) = sink.increment_visit_count(detail.url_id).await {
        warn!(
            "Failed to increment visit count for url {}: {}",
            detail.url_id, e
        );
    }
}
