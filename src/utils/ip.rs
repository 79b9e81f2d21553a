//! 访客 IP 提取
//!
//! 只有直连地址命中 `server.trusted_proxies` 时才采信 X-Forwarded-For / X-Real-IP，
//! 其余情况一律使用连接地址，避免伪造请求头污染访问记录。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::{debug, warn};

/// 单条可信代理规则
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProxyRule {
    Single(IpAddr),
    Cidr { network: IpAddr, prefix_len: u8 },
}

impl ProxyRule {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((network, prefix)) => {
                let network: IpAddr = network.parse().ok()?;
                let prefix_len: u8 = prefix.parse().ok()?;
                let max = if network.is_ipv4() { 32 } else { 128 };
                (prefix_len <= max).then_some(ProxyRule::Cidr {
                    network,
                    prefix_len,
                })
            }
            None => raw.parse().ok().map(ProxyRule::Single),
        }
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            ProxyRule::Single(addr) => addr == ip,
            ProxyRule::Cidr {
                network,
                prefix_len,
            } => ip_in_network(ip, network, *prefix_len),
        }
    }
}

fn ip_in_network(ip: &IpAddr, network: &IpAddr, prefix_len: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(*net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(*net) & mask)
        }
        _ => false,
    }
}

/// 已解析的可信代理列表，启动时构建一次，通过 `web::Data` 共享
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    rules: Vec<ProxyRule>,
}

impl TrustedProxies {
    /// 解析 IP / CIDR 列表，无法解析的条目记录警告后跳过
    pub fn from_config(entries: &[String]) -> Self {
        let rules = entries
            .iter()
            .filter_map(|entry| {
                let rule = ProxyRule::parse(entry);
                if rule.is_none() {
                    warn!("Ignoring invalid trusted proxy entry: {}", entry);
                }
                rule
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 支持 `ip` 与 `ip:port` 两种写法
    pub fn is_trusted(&self, peer: &str) -> bool {
        let ip = match peer.parse::<SocketAddr>() {
            Ok(addr) => addr.ip(),
            Err(_) => match peer.parse::<IpAddr>() {
                Ok(ip) => ip,
                Err(_) => return false,
            },
        };
        self.rules.iter().any(|rule| rule.matches(&ip))
    }
}

/// 从请求中提取访客 IP
pub fn extract_client_ip(req: &HttpRequest, trusted: &TrustedProxies) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    resolve_client_ip(peer.as_deref(), req.headers(), trusted)
}

fn resolve_client_ip(
    peer: Option<&str>,
    headers: &HeaderMap,
    trusted: &TrustedProxies,
) -> Option<String> {
    let Some(peer) = peer else {
        return None;
    };

    if trusted.is_trusted(peer)
        && let Some(forwarded) = forwarded_ip(headers)
    {
        debug!("Trusted proxy {} -> client {}", peer, forwarded);
        return Some(forwarded);
    }

    Some(peer.to_string())
}

/// X-Forwarded-For 取第一个地址，其次 X-Real-IP
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(
                HeaderName::from_static(k),
                HeaderValue::from_static(v),
            );
        }
        map
    }

    #[test]
    fn test_trusted_proxy_rules() {
        let trusted = TrustedProxies::from_config(&[
            "127.0.0.1".to_string(),
            "192.168.1.0/24".to_string(),
            "2001:db8::/32".to_string(),
            "not-an-ip".to_string(),
        ]);

        assert!(trusted.is_trusted("127.0.0.1"));
        assert!(trusted.is_trusted("127.0.0.1:8080"));
        assert!(trusted.is_trusted("192.168.1.50"));
        assert!(trusted.is_trusted("2001:db8::1"));
        assert!(!trusted.is_trusted("192.168.2.1"));
        assert!(!trusted.is_trusted("8.8.8.8"));
    }

    #[test]
    fn test_invalid_prefix_is_skipped() {
        let trusted = TrustedProxies::from_config(&["10.0.0.0/33".to_string()]);
        assert!(trusted.is_empty());
    }

    #[test]
    fn test_forwarded_header_ignored_without_trust() {
        let trusted = TrustedProxies::default();
        let h = headers(&[("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(
            resolve_client_ip(Some("8.8.8.8"), &h, &trusted).as_deref(),
            Some("8.8.8.8")
        );
    }

    #[test]
    fn test_forwarded_header_used_behind_trusted_proxy() {
        let trusted = TrustedProxies::from_config(&["10.0.0.0/8".to_string()]);
        let h = headers(&[("x-forwarded-for", "1.2.3.4, 10.0.0.2")]);
        assert_eq!(
            resolve_client_ip(Some("10.0.0.2"), &h, &trusted).as_deref(),
            Some("1.2.3.4")
        );

        let h = headers(&[("x-real-ip", "5.6.7.8")]);
        assert_eq!(
            resolve_client_ip(Some("10.0.0.2"), &h, &trusted).as_deref(),
            Some("5.6.7.8")
        );
    }

    #[test]
    fn test_no_peer_means_no_ip() {
        let trusted = TrustedProxies::default();
        assert!(resolve_client_ip(None, &HeaderMap::new(), &trusted).is_none());
    }
}
