//! Signup / login

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::jwt::JwtService;
use crate::errors::{Result, ShortenerError};
use crate::storage::{User, UserRepository};
use crate::utils::password::{hash_password, verify_password};

pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub access_token: String,
}

/// 去空白并转小写
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    let valid = !email.is_empty()
        && email.len() <= MAX_EMAIL_LEN
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });

    if valid {
        Ok(())
    } else {
        Err(ShortenerError::validation("Invalid email address"))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ShortenerError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ShortenerError::user_already_exists(
                "A user with this email already exists",
            ));
        }

        let hash = hash_password(password)?;
        let user = self.users.create_user(&email, &hash).await?;
        info!("AuthService: signed up user {}", user.id);

        self.respond(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(ShortenerError::invalid_credentials(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &user.password_hash)? {
            debug!("Login with wrong password for user {}", user.id);
            return Err(ShortenerError::invalid_credentials(INVALID_CREDENTIALS));
        }

        self.respond(user)
    }

    fn respond(&self, user: User) -> Result<AuthResponse> {
        let access_token = self.jwt.issue_access_token(user.id, &user.email)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
