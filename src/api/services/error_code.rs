//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ShortenerError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 账号与认证
/// - 3000-3099: 短链接
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,

    AuthFailed = 2000,
    TokenInvalid = 2002,
    UserAlreadyExists = 2010,

    UrlNotFound = 3000,
    SlugTaken = 3001,
    UrlInvalid = 3002,
    DatabaseError = 3005,
    SlugInvalid = 3006,
    SlugExhausted = 3007,
}

impl From<&ShortenerError> for ErrorCode {
    fn from(err: &ShortenerError) -> Self {
        match err {
            ShortenerError::Validation(_) => ErrorCode::BadRequest,
            ShortenerError::InvalidUrl(_) => ErrorCode::UrlInvalid,
            ShortenerError::InvalidSlug(_) => ErrorCode::SlugInvalid,
            ShortenerError::SlugTaken(_) => ErrorCode::SlugTaken,
            ShortenerError::SlugExhausted(_) => ErrorCode::SlugExhausted,
            ShortenerError::NotFound(_) => ErrorCode::UrlNotFound,
            ShortenerError::UserAlreadyExists(_) => ErrorCode::UserAlreadyExists,
            ShortenerError::InvalidCredentials(_) => ErrorCode::AuthFailed,
            ShortenerError::Unauthorized(_) => ErrorCode::TokenInvalid,
            ShortenerError::DatabaseConfig(_)
            | ShortenerError::DatabaseConnection(_)
            | ShortenerError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            ShortenerError::PasswordHash(_) | ShortenerError::Token(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}
