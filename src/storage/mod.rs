use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStorage;
pub use models::{
    NewUrl, Pagination, UrlRecord, User, VisitRecord, VisitStats, VisitWithSlug,
};
pub use traits::{UrlRepository, UserRepository, VisitRepository};

pub struct StorageFactory;

impl StorageFactory {
    /// 按配置中的 `database_url` 创建存储，数据库类型从 URL 推断
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
