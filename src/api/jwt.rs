use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShortenerError};

/// Access Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 id
    pub sub: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// HS256 签发与校验，启动时构建一次，通过 `web::Data` 共享
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
        }
    }

    pub fn from_config(config: &crate::config::AuthConfig) -> Self {
        if config.jwt_secret == crate::config::DEFAULT_JWT_SECRET {
            tracing::warn!(
                "auth.jwt_secret is the built-in default; set JWT_SECRET before exposing this server"
            );
        }
        Self::new(&config.jwt_secret, config.access_token_minutes)
    }

    pub fn issue_access_token(&self, user_id: i64, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ShortenerError::token(format!("Failed to sign token: {}", e)))
    }

    /// 签名错误、过期、格式错误统一视为未认证
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ShortenerError::unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 60)
    }

    #[test]
    fn test_token_round_trips_user() {
        let jwt = service();
        let token = jwt.issue_access_token(42, "a@example.com").unwrap();
        let claims = jwt.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue_access_token(1, "a@example.com").unwrap();
        let other = JwtService::new("another_secret_key_32_bytes!!!!", 60);
        assert!(matches!(
            other.validate_access_token(&token),
            Err(ShortenerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().validate_access_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: 1,
            email: "a@example.com".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!"),
        )
        .unwrap();

        assert!(service().validate_access_token(&token).is_err());
    }
}
