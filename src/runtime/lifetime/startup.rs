use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analytics::VisitRecorder;
use crate::api::jwt::JwtService;
use crate::config::StaticConfig;
use crate::services::{
    AuthService, RedirectResolver, SlugResolver, ThreadRngSlugSource, UrlService, VisitService,
};
use crate::storage::{SeaOrmStorage, StorageFactory};
use crate::utils::ip::TrustedProxies;

/// 服务器运行所需的全部共享组件，由 `run_server` 注入到 App
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub recorder: Arc<VisitRecorder>,
    pub jwt: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub url_service: Arc<UrlService>,
    pub visit_service: Arc<VisitService>,
    pub redirect_resolver: Arc<RedirectResolver>,
    pub trusted_proxies: TrustedProxies,
}

impl StartupContext {
    /// 基于已有存储组装服务，测试里直接传入临时数据库
    pub fn from_storage(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        let recorder = Arc::new(VisitRecorder::start(
            storage.as_visit_sink(),
            config.analytics.queue_capacity,
        ));
        let jwt = Arc::new(JwtService::from_config(&config.auth));

        let slugs = SlugResolver::new(
            storage.clone(),
            Arc::new(ThreadRngSlugSource),
            config.slug.random_length,
        );

        let trusted_proxies = TrustedProxies::from_config(&config.server.trusted_proxies);
        if trusted_proxies.is_empty() {
            debug!("No trusted proxies configured, using peer address for client IP");
        } else {
            info!(
                "Trusted proxies configured: {:?}",
                config.server.trusted_proxies
            );
        }

        Self {
            auth_service: Arc::new(AuthService::new(storage.clone(), jwt.clone())),
            url_service: Arc::new(UrlService::new(storage.clone(), slugs)),
            visit_service: Arc::new(VisitService::new(storage.clone())),
            redirect_resolver: Arc::new(RedirectResolver::new(storage.clone(), recorder.clone())),
            storage,
            recorder,
            jwt,
            trusted_proxies,
        }
    }
}

/// 准备服务器启动的上下文：连接数据库、跑迁移、启动访问记录 worker
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = crate::config::get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    if config.analytics.queue_capacity == 0 {
        warn!("analytics.queue_capacity is 0, falling back to 1");
    }

    let context = StartupContext::from_storage(storage, &config);

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
