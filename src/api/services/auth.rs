//! 注册 / 登录端点

use std::sync::Arc;

use actix_governor::{GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::{HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::services::AuthService;
use crate::utils::ip::{TrustedProxies, extract_client_ip};

use super::helpers::{created_response, error_from_shortener, success_response};
use super::types::Credentials;

/// 按访客 IP 限流，可信代理后面取转发地址
#[derive(Clone)]
pub struct AuthKeyExtractor {
    trusted: TrustedProxies,
}

impl KeyExtractor for AuthKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        extract_client_ip(req.request(), &self.trusted)
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract client IP"))
    }
}

/// `/auth` 限流配置，所有 worker 共享同一个令牌桶
pub fn auth_rate_limit_config(
    config: &AuthConfig,
    trusted: TrustedProxies,
) -> anyhow::Result<GovernorConfig<AuthKeyExtractor, NoOpMiddleware>> {
    let governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(config.rate_limit_seconds_per_request.max(1))
        .burst_size(config.rate_limit_burst.max(1))
        .key_extractor(AuthKeyExtractor { trusted })
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid auth rate limit settings"))?;

    debug!(
        "Auth rate limiter: 1 req / {}s, burst {}",
        config.rate_limit_seconds_per_request, config.rate_limit_burst
    );
    Ok(governor_config)
}

pub async fn signup(
    service: web::Data<Arc<AuthService>>,
    body: web::Json<Credentials>,
) -> HttpResponse {
    let Credentials { email, password } = body.into_inner();
    match service.signup(&email, &password).await {
        Ok(auth) => {
            info!("Auth API: signup for user {}", auth.user.id);
            created_response(auth)
        }
        Err(e) => error_from_shortener(&e),
    }
}

pub async fn login(
    service: web::Data<Arc<AuthService>>,
    body: web::Json<Credentials>,
) -> HttpResponse {
    let Credentials { email, password } = body.into_inner();
    match service.login(&email, &password).await {
        Ok(auth) => success_response(auth),
        Err(e) => error_from_shortener(&e),
    }
}

/// `/auth/signup`、`/auth/login`；限流在 server 里按配置套上
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/signup", web::post().to(signup))
        .route("/login", web::post().to(login))
}
