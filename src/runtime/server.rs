//! HTTP server startup

use std::time::Duration;

use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, Condition, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::TimingMiddleware;
use crate::api::services::{AppStartTime, auth_rate_limit_config, auth_routes, configure_routes};
use crate::config::CorsConfig;
use crate::runtime::lifetime;

/// 启动时校验 CORS 配置（只跑一次，不在每个 worker 里重复）
fn validate_cors_config(cors: &CorsConfig) {
    if !cors.enabled {
        return;
    }

    if cors.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed."
        );
    }

    if cors.allowed_origins.iter().any(|o| o == "*") && cors.allow_credentials {
        tracing::error!(
            "allowed_origins = [\"*\"] together with allow_credentials is unsafe, credentials disabled"
        );
    }
}

fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 未启用时保持浏览器同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(cors_config.max_age);

    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: 调用前必须已经初始化配置和日志
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let config = crate::config::get_config();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker threads", cpu_count);

    validate_cors_config(&config.cors);
    let cors_config = config.cors.clone();
    let redirect_config = config.redirect.clone();

    let rate_limit_enabled = config.auth.rate_limit_enabled;
    let governor_config =
        auth_rate_limit_config(&config.auth, startup.trusted_proxies.clone())?;
    if !rate_limit_enabled {
        warn!("Auth rate limiting is disabled");
    }

    let storage = startup.storage.clone();
    let jwt = startup.jwt.clone();
    let auth_service = startup.auth_service.clone();
    let url_service = startup.url_service.clone();
    let visit_service = startup.visit_service.clone();
    let redirect_resolver = startup.redirect_resolver.clone();
    let trusted_proxies = startup.trusted_proxies.clone();
    let recorder = startup.recorder.clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(TimingMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Keep-Alive", "timeout=30, max=1000")),
            )
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(jwt.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(url_service.clone()))
            .app_data(web::Data::new(visit_service.clone()))
            .app_data(web::Data::new(redirect_resolver.clone()))
            .app_data(web::Data::new(trusted_proxies.clone()))
            .app_data(web::Data::new(redirect_config.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .service(auth_routes().wrap(Condition::new(
                rate_limit_enabled,
                Governor::new(&governor_config),
            )))
            .configure(configure_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    let shutdown = tokio::spawn(lifetime::shutdown::listen_for_shutdown(server.handle()));

    let result = server.await;
    shutdown.abort();

    // server 已停止，不会再有新的访问入队
    let drain_timeout = Duration::from_secs(config.analytics.drain_timeout_secs);
    lifetime::shutdown::drain_visits(&recorder, drain_timeout).await;

    result?;
    warn!("Graceful shutdown completed");

    Ok(())
}
