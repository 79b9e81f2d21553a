use super::VisitDetail;

/// 访问记录落地目标
///
/// 两步分开调用：写访问行，再给短链接计数 +1。
#[async_trait::async_trait]
pub trait VisitSink: Send + Sync {
    async fn insert_visit(&self, detail: &VisitDetail) -> anyhow::Result<()>;

    /// 单条 `UPDATE ... SET visit_count = visit_count + 1`
    async fn increment_visit_count(&self, url_id: i64) -> anyhow::Result<()>;
}
