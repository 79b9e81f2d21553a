pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod redirect;
pub mod types;
pub mod urls;

use actix_web::http::StatusCode;
use actix_web::{error::InternalError, web};

pub use auth::{auth_rate_limit_config, auth_routes};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, health_routes};
pub use redirect::redirect_routes;
pub use types::ApiResponse;

use crate::api::middleware::RequireUser;
use helpers::error_response;

/// JSON 解析失败也返回统一信封
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
            InternalError::from_response(err, response).into()
        })
}

/// 查询参数解析失败（如 `limit=-1`）同样返回统一信封
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query string: {}", err);
        let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
        InternalError::from_response(err, response).into()
    })
}

/// 注册 `/auth` 以外的全部路由，catch-all 的 slug 路由放在最后
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health_routes())
        .service(
            web::scope("/url")
                .wrap(RequireUser)
                .route("", web::post().to(urls::create_url))
                .route("", web::get().to(urls::list_urls))
                .route("/{id}", web::get().to(urls::get_url))
                .route("/{id}", web::patch().to(urls::update_url))
                .route("/{id}", web::delete().to(urls::delete_url))
                .route("/{id}/stats", web::get().to(urls::url_stats))
                .route("/{id}/visits", web::get().to(urls::url_visits)),
        )
        .service(redirect_routes());
}
