//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::ShortenerError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 ShortenerError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 5xx 的内部细节只写日志，不回传给客户端
pub fn error_from_shortener(err: &ShortenerError) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::from(err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return error_response(status, code, "Internal server error");
    }
    if err.is_conflict() {
        debug!("Request conflicted: {}", err);
    }
    error_response(status, code, err.message())
}

/// 统一 Result → HttpResponse 转换，成功时 200
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_shortener(&e),
    }
}
