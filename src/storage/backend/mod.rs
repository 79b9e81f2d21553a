//! SeaORM storage backend
//!
//! SQLite, MySQL/MariaDB and PostgreSQL through one `DatabaseConnection`.
//! Every query goes through [`retry::with_retry`]; non-idempotent writes use
//! [`retry::with_retry_insert`].

mod connection;
mod converters;
pub mod retry;
pub mod scope;
mod urls;
mod users;
mod visit_sink;
mod visits;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::analytics::VisitSink;
use crate::errors::{Result, ShortenerError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ShortenerError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ShortenerError::database_config("database_url is empty"));
        }

        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig::from(&config.database);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(
                database_url,
                backend_name,
                config.database.pool_size,
                config.database.timeout,
            )
            .await?
        };

        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn as_visit_sink(&self) -> Arc<dyn VisitSink> {
        Arc::new(self.clone())
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 健康检查用的数据库探活
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| ShortenerError::database_connection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend_from_url("shortener.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("sqlite://data/x.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("mysql://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@h/db").unwrap(),
            "postgres"
        );
        assert!(matches!(
            infer_backend_from_url("redis://h"),
            Err(ShortenerError::DatabaseConfig(_))
        ));
    }
}
