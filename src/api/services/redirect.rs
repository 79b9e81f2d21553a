//! 公开重定向端点

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{LOCATION, REFERER, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{error, trace};

use crate::config::RedirectConfig;
use crate::errors::ShortenerError;
use crate::services::{RedirectResolver, VisitorInfo};
use crate::utils::ip::{TrustedProxies, extract_client_ip};

/// 默认未找到页面路径，带斜杠所以不会被 slug 路由匹配
pub const NOT_FOUND_PATH: &str = "/_/not-found";

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Link not found</title></head>\
<body><h1>Link not found</h1><p>This short link does not exist or has been removed.</p></body></html>";

fn header_value(req: &HttpRequest, name: actix_web::http::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn found(location: &str) -> HttpResponse {
    HttpResponse::build(StatusCode::FOUND)
        .insert_header((LOCATION, location))
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .finish()
}

pub async fn handle_redirect(
    req: HttpRequest,
    path: web::Path<String>,
    resolver: web::Data<Arc<RedirectResolver>>,
    trusted: web::Data<TrustedProxies>,
    redirect: web::Data<RedirectConfig>,
) -> HttpResponse {
    let slug = path.into_inner();
    let visitor = VisitorInfo {
        ip: extract_client_ip(&req, &trusted),
        user_agent: header_value(&req, USER_AGENT),
        referer: header_value(&req, REFERER),
    };

    match resolver.resolve(&slug, visitor).await {
        Ok(destination) => {
            trace!("Redirect {} -> {}", slug, destination);
            found(&destination)
        }
        Err(ShortenerError::NotFound(_)) => found(&redirect.not_found_url),
        Err(e) => {
            error!("Redirect lookup failed for {}: {}", slug, e);
            HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .insert_header(("Content-Type", "text/html; charset=utf-8"))
                .body("Internal Server Error")
        }
    }
}

pub async fn not_found_page() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Cache-Control", "public, max-age=60"))
        .body(NOT_FOUND_PAGE)
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route(NOT_FOUND_PATH, web::get().to(not_found_page))
        .route(NOT_FOUND_PATH, web::head().to(not_found_page))
        .route("/{slug}", web::get().to(handle_redirect))
        .route("/{slug}", web::head().to(handle_redirect))
}
