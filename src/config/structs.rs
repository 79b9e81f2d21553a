use serde::{Deserialize, Serialize};

/// 默认 JWT 密钥，仅用于本地开发；启动时若仍是该值会打印警告
pub const DEFAULT_JWT_SECRET: &str = "default_jwt_secret";

/// 静态配置（启动时加载）
///
/// - server: 监听地址、端口、worker 数、可信代理
/// - database: 数据库连接与重试
/// - auth: JWT 与登录限流
/// - slug: 随机 slug 长度
/// - redirect: 未找到时的跳转目标
/// - analytics: 访问记录队列
/// - cors: 前端 Dashboard 跨域
/// - logging: 日志
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub slug: SlugConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：JWT_SECRET > ENV > 配置文件 > 默认值
    /// ENV 前缀：SHORTENER，分隔符：__
    /// 示例：SHORTENER__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SHORTENER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.trusted_proxies")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok());

        let built = builder.and_then(|b| b.build());

        match built {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 可信反向代理（IP 或 CIDR），只有来自这些地址的 X-Forwarded-For 才会被采信
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
    #[serde(default = "default_rate_limit_seconds_per_request")]
    pub rate_limit_seconds_per_request: u64,
}

/// Slug 生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugConfig {
    #[serde(default = "default_random_slug_length")]
    pub random_length: usize,
}

/// 重定向配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// 未知 slug 时 302 跳转的目标
    #[serde(default = "default_not_found_url")]
    pub not_found_url: String,
}

/// 访问记录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 访问记录队列容量，满了直接丢弃
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// 关闭时等待队列排空的最长时间
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
    #[serde(default)]
    pub allow_credentials: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get().min(32)
}

fn default_database_url() -> String {
    "shortener.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_access_token_minutes() -> u64 {
    60
}

fn default_rate_limit_burst() -> u32 {
    5
}

fn default_rate_limit_seconds_per_request() -> u64 {
    1
}

fn default_random_slug_length() -> usize {
    6
}

fn default_not_found_url() -> String {
    "/_/not-found".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_drain_timeout_secs() -> u64 {
    10
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_minutes: default_access_token_minutes(),
            rate_limit_enabled: true,
            rate_limit_burst: default_rate_limit_burst(),
            rate_limit_seconds_per_request: default_rate_limit_seconds_per_request(),
        }
    }
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            random_length: default_random_slug_length(),
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            not_found_url: default_not_found_url(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
            allow_credentials: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.database_url, "shortener.db");
        assert_eq!(config.auth.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.auth.access_token_minutes, 60);
        assert_eq!(config.slug.random_length, 6);
        assert_eq!(config.redirect.not_found_url, "/_/not-found");
        assert_eq!(config.analytics.queue_capacity, 1024);
        assert!(!config.cors.enabled);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: StaticConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [redirect]
            not_found_url = "https://app.example.com/404"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.redirect.not_found_url, "https://app.example.com/404");
        assert_eq!(config.auth.rate_limit_burst, 5);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample should parse");
        assert_eq!(parsed.analytics.drain_timeout_secs, 10);
    }
}
