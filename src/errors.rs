use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    InvalidUrl(String),
    InvalidSlug(String),
    SlugTaken(String),
    SlugExhausted(String),
    NotFound(String),
    UserAlreadyExists(String),
    InvalidCredentials(String),
    Unauthorized(String),
    PasswordHash(String),
    Token(String),
}

impl ShortenerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::DatabaseConfig(_) => "E001",
            ShortenerError::DatabaseConnection(_) => "E002",
            ShortenerError::DatabaseOperation(_) => "E003",
            ShortenerError::Validation(_) => "E004",
            ShortenerError::InvalidUrl(_) => "E005",
            ShortenerError::InvalidSlug(_) => "E006",
            ShortenerError::SlugTaken(_) => "E007",
            ShortenerError::SlugExhausted(_) => "E008",
            ShortenerError::NotFound(_) => "E009",
            ShortenerError::UserAlreadyExists(_) => "E010",
            ShortenerError::InvalidCredentials(_) => "E011",
            ShortenerError::Unauthorized(_) => "E012",
            ShortenerError::PasswordHash(_) => "E013",
            ShortenerError::Token(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::DatabaseConfig(_) => "Database Configuration Error",
            ShortenerError::DatabaseConnection(_) => "Database Connection Error",
            ShortenerError::DatabaseOperation(_) => "Database Operation Error",
            ShortenerError::Validation(_) => "Validation Error",
            ShortenerError::InvalidUrl(_) => "Invalid URL",
            ShortenerError::InvalidSlug(_) => "Invalid Slug",
            ShortenerError::SlugTaken(_) => "Slug Taken",
            ShortenerError::SlugExhausted(_) => "Slug Generation Exhausted",
            ShortenerError::NotFound(_) => "Resource Not Found",
            ShortenerError::UserAlreadyExists(_) => "User Already Exists",
            ShortenerError::InvalidCredentials(_) => "Invalid Credentials",
            ShortenerError::Unauthorized(_) => "Unauthorized",
            ShortenerError::PasswordHash(_) => "Password Hash Error",
            ShortenerError::Token(_) => "Token Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortenerError::DatabaseConfig(msg)
            | ShortenerError::DatabaseConnection(msg)
            | ShortenerError::DatabaseOperation(msg)
            | ShortenerError::Validation(msg)
            | ShortenerError::InvalidUrl(msg)
            | ShortenerError::InvalidSlug(msg)
            | ShortenerError::SlugTaken(msg)
            | ShortenerError::SlugExhausted(msg)
            | ShortenerError::NotFound(msg)
            | ShortenerError::UserAlreadyExists(msg)
            | ShortenerError::InvalidCredentials(msg)
            | ShortenerError::Unauthorized(msg)
            | ShortenerError::PasswordHash(msg)
            | ShortenerError::Token(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShortenerError::Validation(_)
            | ShortenerError::InvalidUrl(_)
            | ShortenerError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
            ShortenerError::SlugTaken(_)
            | ShortenerError::SlugExhausted(_)
            | ShortenerError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            ShortenerError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortenerError::InvalidCredentials(_) | ShortenerError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ShortenerError::DatabaseConfig(_)
            | ShortenerError::DatabaseConnection(_)
            | ShortenerError::DatabaseOperation(_)
            | ShortenerError::PasswordHash(_)
            | ShortenerError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否属于冲突类错误（slug 被占用 / 生成次数耗尽 / 邮箱已注册）
    pub fn is_conflict(&self) -> bool {
        self.http_status() == StatusCode::CONFLICT
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortenerError {}

// 便捷的构造函数
impl ShortenerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Validation(msg.into())
    }

    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        ShortenerError::InvalidUrl(msg.into())
    }

    pub fn invalid_slug<T: Into<String>>(msg: T) -> Self {
        ShortenerError::InvalidSlug(msg.into())
    }

    pub fn slug_taken<T: Into<String>>(msg: T) -> Self {
        ShortenerError::SlugTaken(msg.into())
    }

    pub fn slug_exhausted<T: Into<String>>(msg: T) -> Self {
        ShortenerError::SlugExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn user_already_exists<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UserAlreadyExists(msg.into())
    }

    pub fn invalid_credentials<T: Into<String>>(msg: T) -> Self {
        ShortenerError::InvalidCredentials(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Unauthorized(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        ShortenerError::PasswordHash(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Token(msg.into())
    }
}

impl From<sea_orm::DbErr> for ShortenerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortenerError::DatabaseOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
