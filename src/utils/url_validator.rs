//! 目标 URL 校验
//!
//! 只接受绝对的 http/https URL，长度上限 2048，拒绝回环地址字面量。
//! 不做协议补全，`google.com` 直接判为无效。

use url::Url;

/// 目标 URL 最大长度（字符）
pub const MAX_URL_LENGTH: usize = 2048;

const FORBIDDEN_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// URL 校验失败原因，仅用于给调用方提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    Empty,
    TooLong(usize),
    Malformed(String),
    UnsupportedScheme(String),
    MissingHost,
    ForbiddenHost(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "URL cannot be empty"),
            Self::TooLong(len) => write!(
                f,
                "URL is too long ({} chars, max {})",
                len, MAX_URL_LENGTH
            ),
            Self::Malformed(msg) => write!(f, "Invalid URL format: {}", msg),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported scheme: {}. Only http:// and https:// are allowed",
                scheme
            ),
            Self::MissingHost => write!(f, "URL must have a host"),
            Self::ForbiddenHost(host) => write!(f, "Host is not allowed: {}", host),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 校验目标 URL，成功时返回解析后的 `Url`
pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    if raw.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let len = raw.chars().count();
    if len > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong(len));
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::Malformed(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlValidationError::MissingHost)?;

    let host_lower = host.to_ascii_lowercase();
    if FORBIDDEN_HOSTS.contains(&host_lower.as_str()) {
        return Err(UrlValidationError::ForbiddenHost(host_lower));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://www.example.com").is_ok());
        assert!(validate_url("http://example.com/path?query=1#frag").is_ok());
        assert!(validate_url("HTTPS://Example.com").is_ok());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            validate_url("not-a-url"),
            Err(UrlValidationError::Malformed(_))
        ));
        // 不补全协议
        assert!(matches!(
            validate_url("google.com"),
            Err(UrlValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_unsupported_scheme() {
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_missing_host() {
        // url crate 对特殊 scheme 的空 host 直接报解析错误
        assert!(validate_url("https:///").is_err());
    }

    #[test]
    fn test_forbidden_hosts() {
        for raw in [
            "http://localhost:3000",
            "http://127.0.0.1",
            "http://0.0.0.0",
            "http://LOCALHOST/x",
        ] {
            assert!(
                matches!(validate_url(raw), Err(UrlValidationError::ForbiddenHost(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_length_limit() {
        let base = "https://example.com/";
        let ok = format!("{}{}", base, "a".repeat(MAX_URL_LENGTH - base.len()));
        assert!(validate_url(&ok).is_ok());

        let too_long = format!("{}{}", base, "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(
            validate_url(&too_long),
            Err(UrlValidationError::TooLong(_))
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_url(""), Err(UrlValidationError::Empty));
        assert_eq!(validate_url("   "), Err(UrlValidationError::Empty));
    }
}
