//! 短链接管理端点（需要登录）
//!
//! 不属于调用者的记录统一返回 404。

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::api::middleware::AuthenticatedUser;
use crate::errors::ShortenerError;
use crate::services::{CreateUrlRequest, UpdateUrlRequest, UrlService, VisitService};
use crate::storage::Pagination;

use super::helpers::{api_result, created_response, error_from_shortener, success_response};
use super::types::DeleteResult;

pub async fn create_url(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<Arc<UrlService>>,
    body: web::Json<CreateUrlRequest>,
) -> HttpResponse {
    match service.create(user.id, body.into_inner()).await {
        Ok(record) => created_response(record),
        Err(e) => error_from_shortener(&e),
    }
}

pub async fn list_urls(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<Arc<UrlService>>,
) -> HttpResponse {
    api_result(service.list(user.id).await)
}

pub async fn get_url(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<i64>,
) -> HttpResponse {
    api_result(service.get(user.id, path.into_inner()).await)
}

pub async fn update_url(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<i64>,
    body: web::Json<UpdateUrlRequest>,
) -> HttpResponse {
    api_result(
        service
            .update(user.id, path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_url(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    match service.delete(user.id, id).await {
        Ok(0) => error_from_shortener(&ShortenerError::not_found(format!(
            "URL {} not found",
            id
        ))),
        Ok(deleted) => success_response(DeleteResult { deleted }),
        Err(e) => error_from_shortener(&e),
    }
}

pub async fn url_stats(
    user: web::ReqData<AuthenticatedUser>,
    urls: web::Data<Arc<UrlService>>,
    visits: web::Data<Arc<VisitService>>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();
    if let Err(e) = urls.get(user.id, id).await {
        return error_from_shortener(&e);
    }
    api_result(visits.stats(id).await)
}

pub async fn url_visits(
    user: web::ReqData<AuthenticatedUser>,
    urls: web::Data<Arc<UrlService>>,
    visits: web::Data<Arc<VisitService>>,
    path: web::Path<i64>,
    page: web::Query<Pagination>,
) -> HttpResponse {
    let id = path.into_inner();
    if let Err(e) = urls.get(user.id, id).await {
        return error_from_shortener(&e);
    }
    api_result(visits.history(id, page.into_inner()).await)
}
