//! `VisitRepository` for SeaOrmStorage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::converters::visit_model_to_record;
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::models::{Pagination, VisitRecord, VisitWithSlug};
use crate::storage::traits::VisitRepository;

use migration::entities::{url, visit};

#[async_trait]
impl VisitRepository for SeaOrmStorage {
    async fn count_visits(&self, url_id: i64) -> Result<u64> {
        let db = &self.db;
        let count = retry::with_retry("count_visits", self.retry_config, || async {
            visit::Entity::find()
                .filter(visit::Column::UrlId.eq(url_id))
                .count(db)
                .await
        })
        .await?;
        Ok(count)
    }

    async fn count_visits_since(&self, url_id: i64, since: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;
        let count = retry::with_retry("count_visits_since", self.retry_config, || async {
            visit::Entity::find()
                .filter(visit::Column::UrlId.eq(url_id))
                .filter(visit::Column::VisitedAt.gte(since))
                .count(db)
                .await
        })
        .await?;
        Ok(count)
    }

    async fn count_unique_ips_since(&self, url_id: i64, since: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;
        // COUNT(*) FROM (SELECT DISTINCT ip_address ...)
        let count = retry::with_retry("count_unique_ips_since", self.retry_config, || async {
            visit::Entity::find()
                .select_only()
                .column(visit::Column::IpAddress)
                .distinct()
                .filter(visit::Column::UrlId.eq(url_id))
                .filter(visit::Column::VisitedAt.gte(since))
                .filter(visit::Column::IpAddress.is_not_null())
                .count(db)
                .await
        })
        .await?;
        Ok(count)
    }

    async fn list_visits(&self, url_id: i64, page: Pagination) -> Result<Vec<VisitRecord>> {
        let db = &self.db;
        let models = retry::with_retry("list_visits", self.retry_config, || async {
            visit::Entity::find()
                .filter(visit::Column::UrlId.eq(url_id))
                .order_by_desc(visit::Column::VisitedAt)
                .order_by_desc(visit::Column::Id)
                .limit(page.clamped_limit())
                .offset(page.offset)
                .all(db)
                .await
        })
        .await?;
        Ok(models.into_iter().map(visit_model_to_record).collect())
    }

    async fn list_all_visits(&self, page: Pagination) -> Result<Vec<VisitWithSlug>> {
        let db = &self.db;
        let rows = retry::with_retry("list_all_visits", self.retry_config, || async {
            visit::Entity::find()
                .find_also_related(url::Entity)
                .order_by_desc(visit::Column::VisitedAt)
                .order_by_desc(visit::Column::Id)
                .limit(page.clamped_limit())
                .offset(page.offset)
                .all(db)
                .await
        })
        .await?;

        // 外键级联保证 url 一定存在，缺失时用空 slug 兜底
        Ok(rows
            .into_iter()
            .map(|(visit, url)| VisitWithSlug {
                slug: url.map(|u| u.slug).unwrap_or_default(),
                visit: visit_model_to_record(visit),
            })
            .collect())
    }
}
