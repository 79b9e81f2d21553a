//! Slug → destination resolution

use std::sync::Arc;

use tracing::{debug, trace};

use super::slug::is_valid_slug;
use crate::analytics::{VisitDetail, VisitRecorder};
use crate::errors::{Result, ShortenerError};
use crate::storage::UrlRepository;

/// 访客信息，均可缺失
#[derive(Debug, Clone, Default)]
pub struct VisitorInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

pub struct RedirectResolver {
    urls: Arc<dyn UrlRepository>,
    recorder: Arc<VisitRecorder>,
}

impl RedirectResolver {
    pub fn new(urls: Arc<dyn UrlRepository>, recorder: Arc<VisitRecorder>) -> Self {
        Self { urls, recorder }
    }

    /// 命中时入队访问记录并立即返回目标地址，不等待落库
    pub async fn resolve(&self, slug: &str, visitor: VisitorInfo) -> Result<String> {
        if !is_valid_slug(slug) {
            trace!("Rejected malformed slug: {}", slug);
            return Err(ShortenerError::not_found(format!("Slug '{}' not found", slug)));
        }

        let Some(record) = self.urls.find_by_slug(slug).await? else {
            debug!("Slug not found: {}", slug);
            return Err(ShortenerError::not_found(format!("Slug '{}' not found", slug)));
        };

        let detail = VisitDetail::new(record.id).with_visitor(
            visitor.ip,
            visitor.user_agent,
            visitor.referer,
        );
        self.recorder.record(detail);

        Ok(record.destination)
    }
}
