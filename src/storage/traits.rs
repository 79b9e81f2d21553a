//! 存储层抽象
//!
//! 服务层只依赖这些 trait，测试可以换成内存实现。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{NewUrl, Pagination, UrlRecord, User, VisitRecord, VisitWithSlug};
use crate::errors::Result;

#[async_trait]
pub trait UrlRepository: Send + Sync {
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// slug 唯一索引冲突时返回 `SlugTaken`
    async fn insert_url(&self, new_url: NewUrl) -> Result<UrlRecord>;

    /// 不区分归属，仅供重定向使用
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UrlRecord>>;

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<UrlRecord>>;

    /// created_at 倒序，id 倒序兜底
    async fn list_owned(&self, owner_id: i64) -> Result<Vec<UrlRecord>>;

    /// 记录不存在或不属于 owner 时返回 `None`
    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        destination: Option<String>,
    ) -> Result<Option<UrlRecord>>;

    /// 返回受影响行数（0 或 1）
    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<u64>;
}

#[async_trait]
pub trait VisitRepository: Send + Sync {
    async fn count_visits(&self, url_id: i64) -> Result<u64>;

    async fn count_visits_since(&self, url_id: i64, since: DateTime<Utc>) -> Result<u64>;

    /// 窗口内去重后的非空 IP 数
    async fn count_unique_ips_since(&self, url_id: i64, since: DateTime<Utc>) -> Result<u64>;

    async fn list_visits(&self, url_id: i64, page: Pagination) -> Result<Vec<VisitRecord>>;

    async fn list_all_visits(&self, page: Pagination) -> Result<Vec<VisitWithSlug>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 邮箱已存在时返回 `UserAlreadyExists`
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
