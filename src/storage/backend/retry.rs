//! 数据库操作重试
//!
//! 连接丢失、死锁、SQLite busy/locked 等瞬时错误按指数退避加抖动重试，
//! 其余错误（包括唯一约束冲突）原样返回。
//!
//! INSERT 走 [`with_retry_insert`]：连接在语句发出后断开时无法确定是否已提交，
//! 重放会撞上自己刚写入的行，把成功误报成唯一约束冲突，所以这类错误不重试。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// MySQL 死锁/锁超时，PostgreSQL 序列化失败/死锁，SQLite BUSY/LOCKED
const RETRYABLE_SQL_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

const RETRYABLE_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "serialization failure",
];

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_retryable_runtime(runtime),
        _ => false,
    }
}

/// 重放不会重复写入的错误：语句未执行或事务已被数据库回滚
pub fn is_replay_safe_error(err: &DbErr) -> bool {
    !matches!(err, DbErr::Conn(_)) && is_retryable_error(err)
}

fn is_retryable_runtime(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(code) = sqlx_err
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                return RETRYABLE_SQL_CODES.contains(&&*code);
            }
            message_is_retryable(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => message_is_retryable(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn message_is_retryable(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    RETRYABLE_MESSAGES.iter().any(|needle| lower.contains(needle))
}

/// 重试参数
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 执行 `operation`，对可重试错误最多重试 `max_retries` 次
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_when(operation_name, config, is_retryable_error, operation).await
}

/// 非幂等写入用：只重试 [`is_replay_safe_error`]
pub async fn with_retry_insert<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_when(operation_name, config, is_replay_safe_error, operation).await
}

async fn retry_when<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    should_retry: fn(&DbErr) -> bool,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && should_retry(&e) => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// base * 2^(attempt-1)，封顶 max，再加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Query(RuntimeErr::Internal(
            "database is locked".to_string()
        ))));
        assert!(is_retryable_error(&DbErr::Exec(RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string()
        ))));
        assert!(!is_retryable_error(&DbErr::RecordNotFound(
            "missing".to_string()
        )));
        assert!(!is_retryable_error(&DbErr::Custom("boom".to_string())));
    }

    #[test]
    fn test_backoff_growth_and_cap() {
        assert!((100..=125).contains(&backoff_delay(1, 100, 2000)));
        assert!((400..=500).contains(&backoff_delay(3, 100, 2000)));
        assert!((2000..=2500).contains(&backoff_delay(12, 100, 2000)));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry("flaky", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DbErr::Conn(RuntimeErr::Internal("connection lost".into())))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("down", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Conn(RuntimeErr::Internal("gone".into()))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("bad", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Custom("constraint".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replay_safe_classification() {
        // 断连时无法判断 INSERT 是否已提交
        assert!(!is_replay_safe_error(&DbErr::Conn(RuntimeErr::Internal(
            "connection reset".into()
        ))));
        assert!(is_replay_safe_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
        assert!(is_replay_safe_error(&DbErr::Exec(RuntimeErr::Internal(
            "database is locked".into()
        ))));
        assert!(!is_replay_safe_error(&DbErr::Custom("boom".into())));
    }

    #[tokio::test]
    async fn test_insert_not_replayed_after_lost_connection() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry_insert("insert", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Conn(RuntimeErr::Internal("connection lost".into()))) }
        })
        .await;

        assert!(matches!(result, Err(DbErr::Conn(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_insert_retried_while_locked() {
        let calls = AtomicU32::new(0);
        let result = with_retry_insert("insert", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DbErr::Exec(RuntimeErr::Internal("database is locked".into())))
                } else {
                    Ok(1)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
