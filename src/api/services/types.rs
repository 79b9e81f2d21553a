//! API 响应与请求类型

use serde::{Deserialize, Serialize};

/// 统一响应信封 `{ code, message, data }`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct DeleteResult {
    pub deleted: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub database: String,
    pub backend: String,
    pub response_time_ms: u32,
}
