//! `UrlRepository` for SeaOrmStorage

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};
use tracing::{debug, info};

use super::converters::url_model_to_record;
use super::{SeaOrmStorage, retry, scope};
use crate::errors::{Result, ShortenerError};
use crate::storage::models::{NewUrl, UrlRecord};
use crate::storage::traits::UrlRepository;

use migration::entities::url;

/// 唯一索引冲突说明并发写入抢先占用了 slug
fn map_insert_error(err: DbErr, slug: &str) -> ShortenerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ShortenerError::slug_taken(format!("Slug '{}' is already in use", slug))
        }
        _ => ShortenerError::database_operation(format!("Failed to insert URL: {}", err)),
    }
}

#[async_trait]
impl UrlRepository for SeaOrmStorage {
    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let db = &self.db;
        let count = retry::with_retry("slug_exists", self.retry_config, || async {
            url::Entity::find()
                .filter(url::Column::Slug.eq(slug))
                .count(db)
                .await
        })
        .await?;
        Ok(count > 0)
    }

    async fn insert_url(&self, new_url: NewUrl) -> Result<UrlRecord> {
        let db = &self.db;
        let now = Utc::now();
        let active = url::ActiveModel {
            destination: Set(new_url.destination.clone()),
            slug: Set(new_url.slug.clone()),
            owner_id: Set(new_url.owner_id),
            visit_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = retry::with_retry_insert("insert_url", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_insert_error(e, &new_url.slug))?;

        info!(
            "URL created: id={} slug={} owner={}",
            model.id, model.slug, model.owner_id
        );
        Ok(url_model_to_record(model))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;
        let model = retry::with_retry("find_by_slug", self.retry_config, || async {
            url::Entity::find()
                .filter(url::Column::Slug.eq(slug))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(url_model_to_record))
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<UrlRecord>> {
        let db = &self.db;
        let model = retry::with_retry("find_owned", self.retry_config, || async {
            url::Entity::find()
                .filter(scope::owned_by(id, owner_id))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(url_model_to_record))
    }

    async fn list_owned(&self, owner_id: i64) -> Result<Vec<UrlRecord>> {
        let db = &self.db;
        let models = retry::with_retry("list_owned", self.retry_config, || async {
            url::Entity::find()
                .filter(url::Column::OwnerId.eq(owner_id))
                .order_by_desc(url::Column::CreatedAt)
                .order_by_desc(url::Column::Id)
                .all(db)
                .await
        })
        .await?;

        debug!("Listed {} URLs for owner {}", models.len(), owner_id);
        Ok(models.into_iter().map(url_model_to_record).collect())
    }

    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        destination: Option<String>,
    ) -> Result<Option<UrlRecord>> {
        let Some(destination) = destination else {
            // 没有要写的字段，只做归属检查
            return self.find_owned(id, owner_id).await;
        };

        let db = &self.db;
        let changes = url::ActiveModel {
            destination: Set(destination),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = retry::with_retry("update_owned", self.retry_config, || {
            let changes = changes.clone();
            async move {
                url::Entity::update_many()
                    .set(changes)
                    .filter(scope::owned_by(id, owner_id))
                    .exec(db)
                    .await
            }
        })
        .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!("URL updated: id={} owner={}", id, owner_id);
        self.find_owned(id, owner_id).await
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<u64> {
        let db = &self.db;
        let result = retry::with_retry("delete_owned", self.retry_config, || async {
            url::Entity::delete_many()
                .filter(scope::owned_by(id, owner_id))
                .exec(db)
                .await
        })
        .await?;

        if result.rows_affected > 0 {
            info!("URL deleted: id={} owner={}", id, owner_id);
        }
        Ok(result.rows_affected)
    }
}
