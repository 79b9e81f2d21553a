//! URL record lifecycle
//!
//! 所有读写都按 owner 限定，不属于调用者的记录一律按不存在处理。

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::slug::SlugResolver;
use crate::errors::{Result, ShortenerError};
use crate::storage::{NewUrl, UrlRecord, UrlRepository};
use crate::utils::url_validator::validate_url;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUrlRequest {
    pub destination: String,
    /// 空字符串等同于未提供
    #[serde(default)]
    pub custom_slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUrlRequest {
    #[serde(default)]
    pub destination: Option<String>,
}

pub struct UrlService {
    urls: Arc<dyn UrlRepository>,
    slugs: SlugResolver,
}

fn checked_destination(raw: &str) -> Result<String> {
    let destination = raw.trim();
    validate_url(destination).map_err(|e| ShortenerError::invalid_url(e.to_string()))?;
    Ok(destination.to_string())
}

fn not_found(id: i64) -> ShortenerError {
    ShortenerError::not_found(format!("URL {} not found", id))
}

impl UrlService {
    pub fn new(urls: Arc<dyn UrlRepository>, slugs: SlugResolver) -> Self {
        Self { urls, slugs }
    }

    pub async fn create(&self, owner_id: i64, req: CreateUrlRequest) -> Result<UrlRecord> {
        let destination = checked_destination(&req.destination)?;

        let custom = req.custom_slug.as_deref().filter(|s| !s.is_empty());
        let slug = self.slugs.resolve(custom).await?;

        let record = self
            .urls
            .insert_url(NewUrl {
                destination,
                slug,
                owner_id,
            })
            .await?;

        info!(
            "UrlService: owner {} created '{}' -> '{}'",
            owner_id, record.slug, record.destination
        );
        Ok(record)
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<UrlRecord>> {
        self.urls.list_owned(owner_id).await
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<UrlRecord> {
        self.urls
            .find_owned(id, owner_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        req: UpdateUrlRequest,
    ) -> Result<UrlRecord> {
        let destination = req
            .destination
            .as_deref()
            .map(checked_destination)
            .transpose()?;

        self.urls
            .update_owned(id, owner_id, destination)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// 返回删除的行数，非 owner 删除影响 0 行
    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<u64> {
        self.urls.delete_owned(id, owner_id).await
    }
}
