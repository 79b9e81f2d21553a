use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::HealthResponse;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 存活 + 数据库探活 + 运行时长
pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
    app_start_time: web::Data<AppStartTime>,
) -> HttpResponse {
    let start = Instant::now();
    trace!("Received health check request");

    let database = match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => {
            error!("Database health check failed: {}", e);
            "unhealthy".to_string()
        }
        Err(_) => {
            error!("Database health check timed out");
            "timeout".to_string()
        }
    };
    let healthy = database == "healthy";

    let now = chrono::Utc::now();
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: now.to_rfc3339(),
        uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
        database,
        backend: storage.backend_name().to_string(),
        response_time_ms: start.elapsed().as_millis() as u32,
    };

    if healthy {
        json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(body))
    } else {
        json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError,
            "Database unavailable",
            Some(body),
        )
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
