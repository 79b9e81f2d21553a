use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub destination: String,
    pub slug: String,
    pub owner_id: i64,
    pub visit_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 写入前的短链接（id 与时间戳由存储层分配）
#[derive(Debug, Clone)]
pub struct NewUrl {
    pub destination: String,
    pub slug: String,
    pub owner_id: i64,
}

/// 单次访问记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub visited_at: DateTime<Utc>,
}

/// 全局访问视图条目，附带所属短链接的 slug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitWithSlug {
    #[serde(flatten)]
    pub visit: VisitRecord,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitStats {
    pub total_visits: u64,
    pub recent_visits: u64,
    pub unique_visitors: u64,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 50;
pub const MAX_PAGE_LIMIT: u64 = 500;

/// 分页参数，limit 限制在 1..=500
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    pub fn clamped_limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamp() {
        assert_eq!(Pagination::default().clamped_limit(), 50);
        assert_eq!(Pagination::new(0, 0).clamped_limit(), 1);
        assert_eq!(Pagination::new(10_000, 0).clamped_limit(), 500);
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
