//! `UserRepository` for SeaOrmStorage

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, SqlErr};
use tracing::info;

use super::converters::user_model_to_user;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShortenerError};
use crate::storage::models::User;
use crate::storage::traits::UserRepository;

use migration::entities::user;

#[async_trait]
impl UserRepository for SeaOrmStorage {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let db = &self.db;
        let now = Utc::now();
        let active = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = retry::with_retry_insert("create_user", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ShortenerError::user_already_exists("A user with this email already exists")
            }
            _ => ShortenerError::database_operation(format!("Failed to create user: {}", e)),
        })?;

        info!("User created: id={}", model.id);
        Ok(user_model_to_user(model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = &self.db;
        let model = retry::with_retry("find_by_email", self.retry_config, || async {
            user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(user_model_to_user))
    }
}
