//! Slug 生成与唯一性解析

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{Result, ShortenerError};
use crate::storage::UrlRepository;

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 32;
pub const RANDOM_SLUG_LEN: usize = 6;
/// 随机 slug 最多探测次数
pub const MAX_SLUG_ATTEMPTS: usize = 10;

/// 与固定路由同名的 slug 会被路由遮蔽，永远无法跳转
pub const RESERVED_SLUGS: &[&str] = &["url", "auth", "health", "_"];

const RANDOM_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 随机 slug 来源，测试中可替换为确定序列
pub trait SlugSource: Send + Sync {
    fn next_slug(&self, length: usize) -> String;
}

/// 默认来源：线程本地 RNG，base-36 小写字母数字
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSlugSource;

impl SlugSource for ThreadRngSlugSource {
    fn next_slug(&self, length: usize) -> String {
        std::iter::repeat_with(|| {
            RANDOM_ALPHABET[rand::random_range(0..RANDOM_ALPHABET.len())] as char
        })
        .take(length)
        .collect()
    }
}

/// `^[a-zA-Z0-9_-]{3,32}$`
pub fn is_valid_slug(slug: &str) -> bool {
    (SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// 路由按大小写精确匹配，`Health` 不会被遮蔽
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

pub fn validate_custom_slug(slug: &str) -> Result<()> {
    if !is_valid_slug(slug) {
        return Err(ShortenerError::invalid_slug(format!(
            "Invalid slug '{}': use {}-{} letters, digits, '_' or '-'",
            slug, SLUG_MIN_LEN, SLUG_MAX_LEN
        )));
    }
    if is_reserved_slug(slug) {
        return Err(ShortenerError::invalid_slug(format!(
            "Slug '{}' is reserved",
            slug
        )));
    }
    Ok(())
}

/// 决定新短链接的 slug
///
/// 探测与插入是两步，插入时的唯一索引冲突由存储层转成 `SlugTaken`。
pub struct SlugResolver {
    urls: Arc<dyn UrlRepository>,
    source: Arc<dyn SlugSource>,
    random_length: usize,
}

impl SlugResolver {
    /// `random_length` 会被限制在 6..=32
    pub fn new(
        urls: Arc<dyn UrlRepository>,
        source: Arc<dyn SlugSource>,
        random_length: usize,
    ) -> Self {
        Self {
            urls,
            source,
            random_length: random_length.clamp(RANDOM_SLUG_LEN, SLUG_MAX_LEN),
        }
    }

    pub async fn resolve(&self, custom: Option<&str>) -> Result<String> {
        match custom {
            Some(slug) => self.claim_custom(slug).await,
            None => self.generate().await,
        }
    }

    async fn claim_custom(&self, slug: &str) -> Result<String> {
        validate_custom_slug(slug)?;
        if self.urls.slug_exists(slug).await? {
            return Err(ShortenerError::slug_taken(format!(
                "Slug '{}' is already in use",
                slug
            )));
        }
        Ok(slug.to_string())
    }

    async fn generate(&self) -> Result<String> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = self.source.next_slug(self.random_length);
            // 保留字按冲突处理，同样消耗一次尝试
            if is_reserved_slug(&candidate) {
                debug!("Generated reserved slug '{}', skipping", candidate);
                continue;
            }
            if !self.urls.slug_exists(&candidate).await? {
                debug!("Generated slug '{}' on attempt {}", candidate, attempt);
                return Ok(candidate);
            }
        }

        warn!(
            "No free slug after {} attempts (length {})",
            MAX_SLUG_ATTEMPTS, self.random_length
        );
        Err(ShortenerError::slug_exhausted(format!(
            "Could not generate a unique slug after {} attempts",
            MAX_SLUG_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_shape() {
        assert!(is_valid_slug("abc"));
        assert!(is_valid_slug("my-custom_slug9"));
        assert!(is_valid_slug(&"a".repeat(32)));

        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug(&"a".repeat(33)));
        assert!(!is_valid_slug("bad slug!"));
        assert!(!is_valid_slug("dots.not.ok"));
        assert!(!is_valid_slug("ünï"));
    }

    #[test]
    fn test_validate_custom_slug_error_kind() {
        assert!(matches!(
            validate_custom_slug("ab"),
            Err(ShortenerError::InvalidSlug(_))
        ));
        assert!(validate_custom_slug("mycustomslug").is_ok());
    }

    #[test]
    fn test_reserved_slugs_rejected() {
        for slug in ["url", "auth", "health"] {
            assert!(is_reserved_slug(slug));
            assert!(matches!(
                validate_custom_slug(slug),
                Err(ShortenerError::InvalidSlug(_))
            ));
        }
        assert!(!is_reserved_slug("Health"));
        assert!(validate_custom_slug("healthy").is_ok());
        assert!(validate_custom_slug("urls").is_ok());
    }

    #[test]
    fn test_thread_rng_source_alphabet() {
        let source = ThreadRngSlugSource;
        for _ in 0..50 {
            let slug = source.next_slug(RANDOM_SLUG_LEN);
            assert_eq!(slug.len(), RANDOM_SLUG_LEN);
            assert!(
                slug.bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
            );
            assert!(is_valid_slug(&slug));
        }
    }
}
