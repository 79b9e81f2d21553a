pub mod recorder;
pub mod sink;

pub use recorder::VisitRecorder;
pub use sink::VisitSink;

use chrono::{DateTime, Utc};

/// 列宽上限，超出部分在写入前截断
pub const MAX_IP_LEN: usize = 45;
pub const MAX_USER_AGENT_LEN: usize = 255;
pub const MAX_REFERER_LEN: usize = 2048;

/// 一次重定向产生的访问信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitDetail {
    pub url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub visited_at: DateTime<Utc>,
}

impl VisitDetail {
    pub fn new(url_id: i64) -> Self {
        Self {
            url_id,
            ip_address: None,
            user_agent: None,
            referer: None,
            visited_at: Utc::now(),
        }
    }

    /// 附加访客信息，空字符串视为缺失
    pub fn with_visitor(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
        referer: Option<String>,
    ) -> Self {
        self.ip_address = clip(ip_address, MAX_IP_LEN);
        self.user_agent = clip(user_agent, MAX_USER_AGENT_LEN);
        self.referer = clip(referer, MAX_REFERER_LEN);
        self
    }
}

fn clip(value: Option<String>, max_chars: usize) -> Option<String> {
    let mut value = value.filter(|v| !v.is_empty())?;
    if let Some((idx, _)) = value.char_indices().nth(max_chars) {
        value.truncate(idx);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_fields_are_clipped() {
        let ua = "x".repeat(300);
        let detail = VisitDetail::new(1).with_visitor(
            Some("203.0.113.9".to_string()),
            Some(ua),
            Some(String::new()),
        );

        assert_eq!(detail.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(detail.user_agent.as_ref().map(|s| s.len()), Some(255));
        assert!(detail.referer.is_none());
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let clipped = clip(Some("é".repeat(50)), MAX_IP_LEN).unwrap();
        assert_eq!(clipped.chars().count(), 45);
        assert_eq!(clipped.len(), 90);
    }
}
