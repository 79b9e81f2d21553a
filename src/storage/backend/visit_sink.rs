//! VisitSink implementation for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::trace;

use super::{SeaOrmStorage, retry};
use crate::analytics::{VisitDetail, VisitSink};

use migration::entities::{url, visit};

#[async_trait]
impl VisitSink for SeaOrmStorage {
    async fn insert_visit(&self, detail: &VisitDetail) -> anyhow::Result<()> {
        let db = &self.db;
        let active = visit::ActiveModel {
            url_id: Set(detail.url_id),
            ip_address: Set(detail.ip_address.clone()),
            user_agent: Set(detail.user_agent.clone()),
            referer: Set(detail.referer.clone()),
            visited_at: Set(detail.visited_at),
            ..Default::default()
        };

        retry::with_retry_insert("insert_visit", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to insert visit: {}", e))?;

        trace!("Visit stored for url {}", detail.url_id);
        Ok(())
    }

    async fn increment_visit_count(&self, url_id: i64) -> anyhow::Result<()> {
        let db = &self.db;
        let result = retry::with_retry_insert(
            "increment_visit_count",
            self.retry_config,
            || async {
                url::Entity::update_many()
                    .col_expr(
                        url::Column::VisitCount,
                        Expr::col(url::Column::VisitCount).add(1i64),
                    )
                    .filter(url::Column::Id.eq(url_id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to increment visit count: {}", e))?;

        if result.rows_affected == 0 {
            anyhow::bail!("URL {} no longer exists", url_id);
        }
        Ok(())
    }
}
