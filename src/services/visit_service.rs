//! Visit statistics

use std::sync::Arc;

use chrono::{TimeDelta, Utc};

use crate::errors::Result;
use crate::storage::{Pagination, VisitRecord, VisitRepository, VisitStats, VisitWithSlug};

/// recent / unique 统计窗口
pub const RECENT_WINDOW_DAYS: i64 = 30;

pub struct VisitService {
    visits: Arc<dyn VisitRepository>,
}

impl VisitService {
    pub fn new(visits: Arc<dyn VisitRepository>) -> Self {
        Self { visits }
    }

    /// total 取访问行数而非缓存计数
    pub async fn stats(&self, url_id: i64) -> Result<VisitStats> {
        let since = Utc::now() - TimeDelta::days(RECENT_WINDOW_DAYS);

        let total_visits = self.visits.count_visits(url_id).await?;
        let recent_visits = self.visits.count_visits_since(url_id, since).await?;
        let unique_visitors = self.visits.count_unique_ips_since(url_id, since).await?;

        Ok(VisitStats {
            total_visits,
            recent_visits,
            unique_visitors,
        })
    }

    pub async fn history(&self, url_id: i64, page: Pagination) -> Result<Vec<VisitRecord>> {
        self.visits.list_visits(url_id, page).await
    }

    /// 跨所有短链接的访问记录（不区分归属，未暴露为 HTTP 路由）
    pub async fn all_visits(&self, page: Pagination) -> Result<Vec<VisitWithSlug>> {
        self.visits.list_all_visits(page).await
    }
}
